// src/generator/battlefield.rs
//! Открытое поле сражения
//!
//! В отличие от BSP-семейства холст изначально пустой, а объекты
//! последовательно «штампуются» поверх, каждый только на пустые клетки:
//!
//! 1. **Река** — непрерывное русло по синусоиде через всю ширину или высоту,
//!    с мостом через каждые `bridge_interval` клеток
//! 2. **Хребты** — короткие случайные блуждания камня с предпочтением направления
//! 3. **Руины** — прямоугольники, заполненные кирпичом примерно на 60%
//! 4. **Мини-бункеры** — полоса из трёх клеток, уголок с каменной опорой или
//!    блок 2×2; ставятся только туда, где вся окрестность пуста
//! 5. **Обломки** — одиночный камень или кирпич там, где вокруг достаточно пусто
//! 6. **Лес** — круглые пятна травы
//!
//! Хребты, руины и обломки не ставятся рядом с водой, чтобы не отрезать мосты.
//! После штамповки очищаются безопасные зоны у всех углов; отрезанные угловые
//! зоны соединяются с точкой появления мостом, а прочие недостижимые клетки
//! безусловно запечатываются камнем. Повторных попыток нет.

use super::carve::{chance, clear_zone, corner_zones, spawn_zone};
use super::{GeneratedMap, Generation, MapGenerator};
use crate::config::{BattlefieldSettings, GeneratorKind, RiverAxis, SpawnSettings};
use crate::connectivity::{self, bridge_from, seal_off};
use crate::grid::{Cell, DIRECTIONS, TileGrid};
use crate::tile::TileKind;
use log::{debug, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::PI;

/// Поперечный срез русла в одной позиции вдоль реки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiverSegment {
    /// Столбец (для горизонтальной реки) или строка (для вертикальной)
    pub along: usize,
    /// Первая клетка русла поперёк течения
    pub from: usize,
    pub bridge: bool,
}

/// Проложенное русло
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiverPath {
    pub horizontal: bool,
    pub width: usize,
    pub segments: Vec<RiverSegment>,
}

impl RiverPath {
    /// Клетки русла в срезе
    pub fn cells(&self, segment: &RiverSegment) -> impl Iterator<Item = Cell> + '_ {
        let along = segment.along;
        let horizontal = self.horizontal;
        (segment.from..segment.from + self.width).map(move |across| {
            if horizontal {
                (across, along)
            } else {
                (along, across)
            }
        })
    }
}

/// Форма мини-бункера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bunker {
    /// Три кирпича в ряд
    Bar { vertical: bool },
    /// Уголок из трёх клеток; в вершине — камень
    Corner { flip_row: bool, flip_col: bool },
    /// Кирпичный блок 2×2
    Block,
}

impl Bunker {
    fn random(rng: &mut ChaCha8Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => Bunker::Bar {
                vertical: rng.gen_bool(0.5),
            },
            1 => Bunker::Corner {
                flip_row: rng.gen_bool(0.5),
                flip_col: rng.gen_bool(0.5),
            },
            _ => Bunker::Block,
        }
    }

    /// Клетки шаблона относительно левого верхнего угла рамки 2×2 или 1×3
    fn cells(self) -> Vec<((usize, usize), TileKind)> {
        match self {
            Bunker::Bar { vertical } => (0..3)
                .map(|i| (if vertical { (i, 0) } else { (0, i) }, TileKind::Brick))
                .collect(),
            Bunker::Corner { flip_row, flip_col } => {
                let apex = (usize::from(flip_row), usize::from(flip_col));
                vec![
                    (apex, TileKind::Stone),
                    ((1 - apex.0, apex.1), TileKind::Brick),
                    ((apex.0, 1 - apex.1), TileKind::Brick),
                ]
            }
            Bunker::Block => vec![
                ((0, 0), TileKind::Brick),
                ((0, 1), TileKind::Brick),
                ((1, 0), TileKind::Brick),
                ((1, 1), TileKind::Brick),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct BattlefieldGenerator {
    settings: BattlefieldSettings,
    spawn: SpawnSettings,
}

fn random_interior(grid: &TileGrid, rng: &mut ChaCha8Rng) -> Option<Cell> {
    if grid.rows() < 3 || grid.cols() < 3 {
        return None;
    }
    Some((
        rng.gen_range(1..grid.rows() - 1),
        rng.gen_range(1..grid.cols() - 1),
    ))
}

fn is_open_ground(grid: &TileGrid, cell: Cell) -> bool {
    grid.is_interior(cell)
        && grid.kind(cell) == Some(TileKind::Empty)
        && !grid.near_kind(cell, TileKind::Water)
}

impl BattlefieldGenerator {
    #[must_use]
    pub fn new(settings: BattlefieldSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    /// Прокладывает реку. Русло заливается водой, срезы на кратных
    /// `bridge_interval` позициях остаются землёй (мост).
    pub fn stamp_river(
        &self,
        grid: &mut TileGrid,
        horizontal: bool,
        rng: &mut ChaCha8Rng,
    ) -> RiverPath {
        let (along_len, across_len) = if horizontal {
            (grid.cols(), grid.rows())
        } else {
            (grid.rows(), grid.cols())
        };
        let width = self.settings.river_width.min(across_len.saturating_sub(2));
        let mut path = RiverPath {
            horizontal,
            width,
            segments: Vec::new(),
        };
        if width == 0 || along_len < 3 {
            return path;
        }

        let phase = rng.gen_range(0.0..2.0 * PI);
        let base = across_len as f32 / 2.0;
        let last_from = across_len - 1 - width;
        let interval = self.settings.bridge_interval;
        let mut previous: Option<usize> = None;

        for along in 1..along_len - 1 {
            let wave = self.settings.river_amplitude
                * (along as f32 * self.settings.river_frequency + phase).sin();
            let center = (base + wave).round() as i32;
            let mut from = (center - (width / 2) as i32).clamp(1, last_from as i32) as usize;
            // Соседние срезы перекрываются хотя бы одной клеткой, иначе
            // между ними остаётся сухой переход
            if let Some(prev) = previous {
                from = from.clamp(prev.saturating_sub(width - 1), prev + width - 1);
            }
            previous = Some(from);
            let segment = RiverSegment {
                along,
                from,
                bridge: interval > 0 && along % interval == 0,
            };
            let kind = if segment.bridge {
                TileKind::Empty
            } else {
                TileKind::Water
            };
            for (row, col) in path.cells(&segment).collect::<Vec<_>>() {
                grid.set_kind(row, col, kind);
            }
            path.segments.push(segment);
        }
        path
    }

    fn stamp_ridges(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        for _ in 0..self.settings.ridges {
            let Some(mut pos) = random_interior(grid, rng) else {
                return;
            };
            let mut dir = DIRECTIONS[rng.gen_range(0..4)];
            let length = self.settings.ridge_length + rng.gen_range(0..=self.settings.ridge_length / 2);

            for _ in 0..length {
                if is_open_ground(grid, pos) {
                    grid.set_kind(pos.0, pos.1, TileKind::Stone);
                }
                // Чаще идём прямо, иногда сворачиваем под прямым углом
                if !chance(rng, 0.7) {
                    dir = if rng.gen_bool(0.5) {
                        (dir.1, dir.0)
                    } else {
                        (-dir.1, -dir.0)
                    };
                }
                let next = (pos.0 as i32 + dir.0, pos.1 as i32 + dir.1);
                if next.0 < 0 || next.1 < 0 || !grid.is_interior((next.0 as usize, next.1 as usize)) {
                    break;
                }
                pos = (next.0 as usize, next.1 as usize);
            }
        }
    }

    fn stamp_ruins(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        for _ in 0..self.settings.ruins {
            let Some((row, col)) = random_interior(grid, rng) else {
                return;
            };
            let height = rng.gen_range(3..=5);
            let width = rng.gen_range(3..=5);
            for r in row..row + height {
                for c in col..col + width {
                    if is_open_ground(grid, (r, c)) && chance(rng, self.settings.ruin_fill) {
                        grid.set_kind(r, c, TileKind::Brick);
                    }
                }
            }
        }
    }

    /// Ставит бункер с левым верхним углом в `anchor`, если вся окрестность
    /// шаблона (рамка плюс одна клетка) пуста и лежит внутри стены.
    pub fn try_place_bunker(grid: &mut TileGrid, anchor: Cell, bunker: Bunker) -> bool {
        let cells = bunker.cells();
        let height = cells.iter().map(|((r, _), _)| r + 1).max().unwrap_or(0);
        let width = cells.iter().map(|((_, c), _)| c + 1).max().unwrap_or(0);
        if anchor.0 == 0 || anchor.1 == 0 {
            return false;
        }

        for r in anchor.0 - 1..=anchor.0 + height {
            for c in anchor.1 - 1..=anchor.1 + width {
                if grid.kind((r, c)) != Some(TileKind::Empty) {
                    return false;
                }
            }
        }

        for ((dr, dc), kind) in cells {
            grid.set_kind(anchor.0 + dr, anchor.1 + dc, kind);
        }
        true
    }

    fn stamp_bunkers(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        let mut placed = 0;
        for _ in 0..self.settings.bunkers * 10 {
            if placed >= self.settings.bunkers {
                break;
            }
            let Some(anchor) = random_interior(grid, rng) else {
                return;
            };
            let bunker = Bunker::random(rng);
            if Self::try_place_bunker(grid, anchor, bunker) {
                placed += 1;
            }
        }
    }

    fn stamp_debris(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        let mut placed = 0;
        for _ in 0..self.settings.debris * 4 {
            if placed >= self.settings.debris {
                break;
            }
            let Some(cell) = random_interior(grid, rng) else {
                return;
            };
            if is_open_ground(grid, cell)
                && grid.count_neighbors8(cell, TileKind::Empty) >= self.settings.debris_min_empty
            {
                let kind = if chance(rng, 0.3) {
                    TileKind::Stone
                } else {
                    TileKind::Brick
                };
                grid.set_kind(cell.0, cell.1, kind);
                placed += 1;
            }
        }
    }

    fn stamp_forests(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        for _ in 0..self.settings.forests {
            let Some((row, col)) = random_interior(grid, rng) else {
                return;
            };
            let radius = (self.settings.forest_radius + rng.gen_range(0..=1)) as i32;
            for dr in -radius..=radius {
                for dc in -radius..=radius {
                    if dr * dr + dc * dc > radius * radius {
                        continue;
                    }
                    let (r, c) = (row as i32 + dr, col as i32 + dc);
                    if grid.kind_at(r, c) == Some(TileKind::Empty) && grid.is_interior((r as usize, c as usize)) {
                        grid.set_kind(r as usize, c as usize, TileKind::Grass);
                    }
                }
            }
        }
    }

    /// Все объекты до очистки зон и запечатывания
    pub fn stamp_features(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> TileGrid {
        let mut grid = TileGrid::filled(rows, cols, TileKind::Empty);
        grid.enclose();

        let horizontal = match self.settings.river_axis {
            RiverAxis::Horizontal => Some(true),
            RiverAxis::Vertical => Some(false),
            RiverAxis::Random => Some(rng.gen_bool(0.5)),
            RiverAxis::None => None,
        };
        if let Some(horizontal) = horizontal {
            let river = self.stamp_river(&mut grid, horizontal, rng);
            debug!(
                "battlefield river: {} segments, {} bridges",
                river.segments.len(),
                river.segments.iter().filter(|s| s.bridge).count()
            );
        }

        self.stamp_ridges(&mut grid, rng);
        self.stamp_ruins(&mut grid, rng);
        self.stamp_bunkers(&mut grid, rng);
        self.stamp_debris(&mut grid, rng);
        self.stamp_forests(&mut grid, rng);
        grid
    }
}

impl MapGenerator for BattlefieldGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Battlefield
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        let mut grid = self.stamp_features(rows, cols, rng);

        let corners = corner_zones(&grid, self.spawn.zone);
        for zone in corners {
            clear_zone(&mut grid, zone);
        }
        let zone = spawn_zone(&grid, self.spawn.cell, self.spawn.zone);
        clear_zone(&mut grid, zone);

        let rule = self.walkability();
        let mut report = connectivity::check(&grid, self.spawn.cell, rule);
        // Отрезанные угловые зоны соединяются мостом, остальное запечатывается
        for zone in corners {
            if zone.width == 0 || zone.height == 0 {
                continue;
            }
            if bridge_from(&mut grid, &mut report, zone.center(), self.spawn.cell).is_none() {
                warn!("battlefield: corner zone at {:?} stays cut off", zone.center());
            }
        }
        seal_off(&mut grid, &report);
        let reachable_ratio = connectivity::check(&grid, self.spawn.cell, rule).ratio();

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
    use rand::SeedableRng;

    fn generator() -> BattlefieldGenerator {
        BattlefieldGenerator::new(BattlefieldSettings::default(), SpawnSettings::default())
    }

    #[test]
    fn river_has_bridges_at_every_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut grid = TileGrid::filled(22, 30, TileKind::Empty);
        grid.enclose();
        let river = generator().stamp_river(&mut grid, true, &mut rng);

        assert_eq!(river.width, 3);
        assert_eq!(river.segments.len(), 28);
        for segment in &river.segments {
            let kinds: Vec<TileKind> = river
                .cells(segment)
                .map(|cell| grid.kind(cell).unwrap())
                .collect();
            if segment.along % 15 == 0 {
                assert!(segment.bridge);
                assert!(kinds.iter().all(|&k| k == TileKind::Empty));
            } else {
                assert!(kinds.iter().all(|&k| k == TileKind::Water), "column {}", segment.along);
            }
        }
        assert!(river.segments.iter().any(|s| s.along == 15 && s.bridge));
    }

    #[test]
    fn vertical_river_runs_top_to_bottom() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut grid = TileGrid::filled(22, 30, TileKind::Empty);
        grid.enclose();
        let river = generator().stamp_river(&mut grid, false, &mut rng);
        assert_eq!(river.segments.len(), 20);
        assert!(river.segments.iter().all(|s| !s.bridge || s.along == 15));
        for segment in &river.segments {
            for (row, col) in river.cells(segment) {
                assert_eq!(row, segment.along);
                assert!((1..29).contains(&col));
            }
        }
    }

    #[test]
    fn bunker_needs_a_fully_empty_neighborhood() {
        let mut grid = TileGrid::filled(10, 10, TileKind::Empty);
        grid.enclose();
        assert!(BattlefieldGenerator::try_place_bunker(&mut grid, (3, 3), Bunker::Block));
        assert_eq!(grid.count(TileKind::Brick), 4);
        // вплотную к уже стоящему блоку нельзя
        assert!(!BattlefieldGenerator::try_place_bunker(&mut grid, (3, 5), Bunker::Bar { vertical: true }));
        // и вплотную к стене тоже
        assert!(!BattlefieldGenerator::try_place_bunker(&mut grid, (8, 7), Bunker::Block));

        assert!(BattlefieldGenerator::try_place_bunker(
            &mut grid,
            (6, 6),
            Bunker::Corner { flip_row: false, flip_col: false }
        ));
        assert_eq!(grid.kind((6, 6)), Some(TileKind::Stone));
        assert_eq!(grid.kind((7, 6)), Some(TileKind::Brick));
        assert_eq!(grid.kind((6, 7)), Some(TileKind::Brick));
        assert_eq!(grid.kind((7, 7)), Some(TileKind::Empty));
    }

    #[test]
    fn battlefield_is_fully_connected_after_sealing() {
        let generator = generator();
        for seed in 0..30 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generator.generate(22, 30, &mut rng).unwrap();
            let report = check(&map.grid, (1, 1), Walkability::Breachable);
            assert!(report.is_fully_connected(), "seed {seed}");
            assert!((map.reachable_ratio - 1.0).abs() < f32::EPSILON);
            for row in 1..=3 {
                for col in 1..=3 {
                    assert!(map.grid.kind((row, col)).unwrap().tank_passable());
                }
            }
        }
    }

    #[test]
    fn features_stamp_every_terrain_kind() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let grid = generator().stamp_features(22, 30, &mut rng);
        assert!(grid.count(TileKind::Water) > 0);
        assert!(grid.count(TileKind::Brick) > 0);
        assert!(grid.count(TileKind::Grass) > 0);
        // стена + хребты
        assert!(grid.count(TileKind::Stone) > 2 * (22 + 30) - 4);
    }

    #[test]
    fn corner_zones_survive_sealing() {
        let generator = generator();
        for seed in 0..400 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generator.generate(22, 30, &mut rng).unwrap();
            let report = check(&map.grid, (1, 1), Walkability::Breachable);
            assert!(report.is_fully_connected(), "seed {seed}");
            for zone in corner_zones(&map.grid, 3) {
                for cell in zone.cells() {
                    assert!(
                        map.grid.kind(cell).is_some_and(TileKind::tank_passable),
                        "seed {seed}: {cell:?} in {zone:?}"
                    );
                    assert!(report.is_reached(cell), "seed {seed}: {cell:?}");
                }
            }
        }
    }

    #[test]
    fn steep_river_has_no_dry_crossing() {
        let settings = BattlefieldSettings {
            river_amplitude: 6.0,
            river_frequency: 1.0,
            bridge_interval: 0,
            ..BattlefieldSettings::default()
        };
        let generator = BattlefieldGenerator::new(settings, SpawnSettings::default());
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = TileGrid::filled(22, 30, TileKind::Empty);
            grid.enclose();
            let river = generator.stamp_river(&mut grid, true, &mut rng);

            for pair in river.segments.windows(2) {
                assert!(pair[0].from.abs_diff(pair[1].from) < river.width, "seed {seed}");
            }
            // берег над руслом не сообщается с берегом под ним
            let report = check(&grid, (1, 1), Walkability::Breachable);
            for segment in &river.segments {
                for row in segment.from + river.width..grid.rows() - 1 {
                    assert!(
                        !report.is_reached((row, segment.along)),
                        "seed {seed}: ({row}, {})",
                        segment.along
                    );
                }
            }
        }
    }
}
