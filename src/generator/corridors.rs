// src/generator/corridors.rs
//! BSP только из коридоров
//!
//! Комнат нет: холст остаётся каменным, кроме коридоров между центрами
//! сестринских узлов. Такие коридоры образуют дерево без циклов, поэтому после
//! соединения в случайных местах пробиваются проёмы 2×2 — они добавляют петли.
//! В конце открываются все четыре угловые зоны появления и прокладываются мосты.

use super::bsp::{BspLayout, Corridor};
use super::carve::{
    carve_l_corridor, carve_opening, clear_zone, connect_with_bridges, corner_zones, spawn_zone,
};
use super::{GeneratedMap, Generation, MapGenerator};
use crate::config::{BspSettings, GeneratorKind, SpawnSettings};
use crate::grid::TileGrid;
use crate::partition::PartitionTree;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct CorridorsOnly {
    settings: BspSettings,
    spawn: SpawnSettings,
}

impl CorridorsOnly {
    #[must_use]
    pub fn new(settings: BspSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    /// Коридоры между центрами сестринских узлов, без проёмов и угловых зон
    pub fn layout(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> BspLayout {
        let mut grid = TileGrid::new(rows, cols);
        let tree = PartitionTree::build(
            grid.playable_area(),
            self.settings.min_leaf_size,
            self.settings.split_bias,
            rng,
        );

        let mut corridors = Vec::new();
        for node in tree.internal_nodes() {
            let Some((left, right)) = tree.node(node).children else {
                continue;
            };
            let from = tree.node(left).rect.center();
            let to = tree.node(right).rect.center();
            carve_l_corridor(
                &mut grid,
                from,
                to,
                self.settings.corridor_width,
                self.settings.corridor_brick_chance,
                rng,
            );
            corridors.push(Corridor { node, from, to });
        }

        BspLayout {
            grid,
            tree,
            corridors,
        }
    }
}

impl MapGenerator for CorridorsOnly {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::CorridorsOnly
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        let mut grid = self.layout(rows, cols, rng).grid;

        // Проёмы 2×2 целиком внутри стены
        if rows >= 4 && cols >= 4 {
            for _ in 0..self.settings.loop_openings {
                let row = rng.gen_range(1..=rows - 3);
                let col = rng.gen_range(1..=cols - 3);
                carve_opening(&mut grid, (row, col), 2);
            }
        }

        for zone in corner_zones(&grid, self.spawn.zone) {
            clear_zone(&mut grid, zone);
        }
        let zone = spawn_zone(&grid, self.spawn.cell, self.spawn.zone);
        clear_zone(&mut grid, zone);

        let reachable_ratio = connect_with_bridges(&mut grid, self.spawn.cell, self.walkability());
        Ok(GeneratedMap {
            kind: self.kind(),
            grid,
            attempts: 1,
            reachable_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{Walkability, check};
    use crate::tile::TileKind;
    use rand::SeedableRng;

    #[test]
    fn sibling_centers_form_one_connected_network() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generator = CorridorsOnly::new(BspSettings::default(), SpawnSettings::default());
            let layout = generator.layout(22, 30, &mut rng);
            let root_center = layout.tree.node(layout.tree.root()).rect.center();
            let report = check(&layout.grid, root_center, Walkability::Breachable);
            assert!(report.is_fully_connected(), "seed {seed}");
            for leaf in layout.tree.leaves() {
                assert!(report.is_reached(layout.tree.node(leaf).rect.center()));
            }
        }
    }

    #[test]
    fn corners_are_open_and_reachable() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generator = CorridorsOnly::new(BspSettings::default(), SpawnSettings::default());
            let map = generator.generate(22, 30, &mut rng).unwrap();
            for cell in [(1, 1), (1, 28), (20, 1), (20, 28)] {
                assert_eq!(map.grid.kind(cell), Some(TileKind::Empty), "seed {seed}");
            }
            let report = check(&map.grid, (1, 1), Walkability::Breachable);
            assert!(report.is_fully_connected(), "seed {seed}");
            assert!(report.is_reached((20, 28)));
        }
    }

    #[test]
    fn no_rooms_means_mostly_stone() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let generator = CorridorsOnly::new(BspSettings::default(), SpawnSettings::default());
        let map = generator.generate(22, 30, &mut rng).unwrap();
        assert!(map.grid.count(TileKind::Stone) > map.grid.len() / 2);
    }
}
