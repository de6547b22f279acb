// src/generator/bsp.rs
//! BSP-генераторы с комнатами
//!
//! Холст изначально полностью каменный. Дерево разбиения строится по игровой
//! области, в каждом листе вырезается комната, затем каждый внутренний узел
//! соединяет представительные комнаты своих детей L-образным коридором.
//!
//! Два варианта отличаются только стилем:
//! - `RoomsAndCorridors` — комнаты случайного размера, заметное убранство,
//!   коридоры оставляют часть камня кирпичом
//! - `StrictBsp` — комнаты ровно с отступом в одну клетку, лёгкое убранство,
//!   коридоры перезаписывают всё

use super::carve::{carve_l_corridor, chance, clear_zone, connect_with_bridges, spawn_zone};
use super::{GeneratedMap, Generation, MapGenerator};
use crate::config::{BspSettings, GeneratorKind, SpawnSettings};
use crate::connectivity::Walkability;
use crate::grid::{Cell, Rect, TileGrid};
use crate::partition::PartitionTree;
use crate::tile::TileKind;
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Стиль вырезания комнат и коридоров
#[derive(Debug, Clone, Copy)]
struct RoomStyle {
    padding: usize,
    shrink: usize,
    brick_chance: f64,
    stone_chance: f64,
    corridor_width: usize,
    corridor_brick_chance: f64,
}

/// Коридор между детьми внутреннего узла
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corridor {
    pub node: usize,
    pub from: Cell,
    pub to: Cell,
}

/// Промежуточный результат: сетка и каркас, по которому она вырезана
#[derive(Debug, Clone)]
pub struct BspLayout {
    pub grid: TileGrid,
    pub tree: PartitionTree,
    pub corridors: Vec<Corridor>,
}

fn place_room<R: Rng>(leaf: Rect, style: RoomStyle, rng: &mut R) -> Rect {
    let inner_w = leaf.width.saturating_sub(style.padding * 2).max(1);
    let inner_h = leaf.height.saturating_sub(style.padding * 2).max(1);
    let pad_x = style.padding.min(leaf.width.saturating_sub(inner_w));
    let pad_y = style.padding.min(leaf.height.saturating_sub(inner_h));

    let shrink_w = rng.gen_range(0..=style.shrink);
    let shrink_h = rng.gen_range(0..=style.shrink);
    let width = inner_w.saturating_sub(shrink_w).max(2).min(inner_w);
    let height = inner_h.saturating_sub(shrink_h).max(2).min(inner_h);

    let x = leaf.x + pad_x + rng.gen_range(0..=inner_w - width);
    let y = leaf.y + pad_y + rng.gen_range(0..=inner_h - height);
    Rect::new(x, y, width, height)
}

/// Убранство: кирпич или камень внутри комнаты, кроме кольца у стен и центра
fn decorate_room<R: Rng>(grid: &mut TileGrid, room: Rect, style: RoomStyle, rng: &mut R) {
    let center = room.center();
    for cell in room.cells() {
        if room.on_edge(cell) || cell == center {
            continue;
        }
        if chance(rng, style.brick_chance) {
            grid.set_kind(cell.0, cell.1, TileKind::Brick);
        } else if chance(rng, style.stone_chance) {
            grid.set_kind(cell.0, cell.1, TileKind::Stone);
        }
    }
}

fn carve_layout<R: Rng>(
    rows: usize,
    cols: usize,
    settings: &BspSettings,
    style: RoomStyle,
    rng: &mut R,
) -> BspLayout {
    let mut grid = TileGrid::new(rows, cols);
    let mut tree = PartitionTree::build(
        grid.playable_area(),
        settings.min_leaf_size,
        settings.split_bias,
        rng,
    );

    let leaves: Vec<usize> = tree.leaves().collect();
    for &leaf in &leaves {
        let rect = tree.node(leaf).rect;
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let room = place_room(rect, style, rng);
        grid.fill_rect(room, TileKind::Empty);
        decorate_room(&mut grid, room, style, rng);
        tree.set_room(leaf, room);
    }

    let internal: Vec<usize> = tree.internal_nodes().collect();
    let mut corridors = Vec::with_capacity(internal.len());
    for node in internal {
        let Some((left, right)) = tree.node(node).children else {
            continue;
        };
        let (Some(a), Some(b)) = (
            tree.representative_room(left, rng),
            tree.representative_room(right, rng),
        ) else {
            continue;
        };
        let (from, to) = (a.center(), b.center());
        carve_l_corridor(
            &mut grid,
            from,
            to,
            style.corridor_width,
            style.corridor_brick_chance,
            rng,
        );
        corridors.push(Corridor { node, from, to });
    }

    debug!(
        "bsp layout: {} leaves, depth {}, {} corridors",
        leaves.len(),
        tree.depth(),
        corridors.len()
    );
    BspLayout {
        grid,
        tree,
        corridors,
    }
}

fn finish(
    kind: GeneratorKind,
    mut grid: TileGrid,
    spawn: &SpawnSettings,
    rule: Walkability,
) -> GeneratedMap {
    let zone = spawn_zone(&grid, spawn.cell, spawn.zone);
    clear_zone(&mut grid, zone);
    let reachable_ratio = connect_with_bridges(&mut grid, spawn.cell, rule);
    GeneratedMap {
        kind,
        grid,
        attempts: 1,
        reachable_ratio,
    }
}

/// Комнаты и коридоры
#[derive(Debug, Clone)]
pub struct RoomsAndCorridors {
    settings: BspSettings,
    spawn: SpawnSettings,
}

impl RoomsAndCorridors {
    #[must_use]
    pub fn new(settings: BspSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    fn style(&self) -> RoomStyle {
        RoomStyle {
            padding: self.settings.room_padding,
            shrink: self.settings.room_shrink,
            brick_chance: self.settings.decor_brick_chance,
            stone_chance: self.settings.decor_stone_chance,
            corridor_width: self.settings.corridor_width,
            corridor_brick_chance: self.settings.corridor_brick_chance,
        }
    }

    /// Вырезает комнаты и коридоры без финальной очистки зоны и мостов
    pub fn layout(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> BspLayout {
        carve_layout(rows, cols, &self.settings, self.style(), rng)
    }
}

impl MapGenerator for RoomsAndCorridors {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::RoomsAndCorridors
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        let layout = self.layout(rows, cols, rng);
        Ok(finish(
            self.kind(),
            layout.grid,
            &self.spawn,
            self.walkability(),
        ))
    }
}

/// Строгий BSP: ровные комнаты и коридоры без кирпича
#[derive(Debug, Clone)]
pub struct StrictBsp {
    settings: BspSettings,
    spawn: SpawnSettings,
}

impl StrictBsp {
    #[must_use]
    pub fn new(settings: BspSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    fn style(&self) -> RoomStyle {
        RoomStyle {
            padding: 1,
            shrink: 0,
            brick_chance: self.settings.strict_brick_chance,
            stone_chance: 0.0,
            corridor_width: self.settings.corridor_width,
            corridor_brick_chance: 0.0,
        }
    }

    pub fn layout(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> BspLayout {
        carve_layout(rows, cols, &self.settings, self.style(), rng)
    }
}

impl MapGenerator for StrictBsp {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::StrictBsp
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        let layout = self.layout(rows, cols, rng);
        Ok(finish(
            self.kind(),
            layout.grid,
            &self.spawn,
            self.walkability(),
        ))
    }
}
