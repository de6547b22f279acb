// src/generator/carve.rs
//! Общие операции вырезания: коридоры, проёмы, безопасные зоны, мосты

use crate::connectivity::{self, Walkability, bridge_pockets};
use crate::grid::{Cell, Rect, TileGrid};
use crate::tile::TileKind;
use rand::Rng;

/// Бросок вероятности, устойчивый к значениям вне `[0, 1]`
pub(crate) fn chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    probability > 0.0 && rng.gen_range(0.0..1.0) < probability
}

/// Начало полосы ширины `width`, целиком лежащей внутри стены
fn band_start(at: usize, width: usize, limit: usize) -> usize {
    let last = limit.saturating_sub(1 + width).max(1);
    at.clamp(1, last)
}

fn carve_tile<R: Rng>(grid: &mut TileGrid, cell: Cell, brick_chance: f64, rng: &mut R) {
    if !grid.is_interior(cell) {
        return;
    }
    let kind = if grid.kind(cell) == Some(TileKind::Stone) && chance(rng, brick_chance) {
        TileKind::Brick
    } else {
        TileKind::Empty
    };
    grid.set_kind(cell.0, cell.1, kind);
}

/// L-образный коридор шириной `width`: сначала горизонталь в строке `from`,
/// затем вертикаль в столбце `to`. Всё, что пересекает коридор, становится
/// пустым; пересечённый камень с вероятностью `brick_chance` остаётся кирпичом.
pub fn carve_l_corridor<R: Rng>(
    grid: &mut TileGrid,
    from: Cell,
    to: Cell,
    width: usize,
    brick_chance: f64,
    rng: &mut R,
) {
    let width = width.max(1);
    let row = band_start(from.0, width, grid.rows());
    let col = band_start(to.1, width, grid.cols());
    let end_row = band_start(to.0, width, grid.rows());
    let start_col = band_start(from.1, width, grid.cols());

    // Горизонтальный отрезок доходит до вертикального, включая угол
    for r in row..row + width {
        for c in start_col.min(col)..start_col.max(col) + width {
            carve_tile(grid, (r, c), brick_chance, rng);
        }
    }
    for c in col..col + width {
        for r in row.min(end_row)..row.max(end_row) + width {
            carve_tile(grid, (r, c), brick_chance, rng);
        }
    }
}

/// Квадратный проём `size × size` с левым верхним углом в `cell`
pub(crate) fn carve_opening(grid: &mut TileGrid, cell: Cell, size: usize) {
    for r in cell.0..cell.0 + size {
        for c in cell.1..cell.1 + size {
            if grid.is_interior((r, c)) {
                grid.set_kind(r, c, TileKind::Empty);
            }
        }
    }
}

/// Квадратная зона `zone × zone` у клетки `anchor`, сдвинутая внутрь стены
#[must_use]
pub fn spawn_zone(grid: &TileGrid, anchor: Cell, zone: usize) -> Rect {
    let area = grid.playable_area();
    let size = zone.min(area.width).min(area.height);
    if size == 0 {
        return Rect::new(1, 1, 0, 0);
    }
    let row = band_start(anchor.0, size, grid.rows());
    let col = band_start(anchor.1, size, grid.cols());
    Rect::new(col, row, size, size)
}

/// Зоны у четырёх углов игровой области
pub(crate) fn corner_zones(grid: &TileGrid, zone: usize) -> [Rect; 4] {
    let far_row = grid.rows().saturating_sub(1 + zone);
    let far_col = grid.cols().saturating_sub(1 + zone);
    [
        spawn_zone(grid, (1, 1), zone),
        spawn_zone(grid, (1, far_col), zone),
        spawn_zone(grid, (far_row, 1), zone),
        spawn_zone(grid, (far_row, far_col), zone),
    ]
}

pub(crate) fn clear_zone(grid: &mut TileGrid, zone: Rect) {
    grid.fill_rect(zone, TileKind::Empty);
}

/// Проверка связности и мосты из всех карманов; возвращает итоговую долю
pub(crate) fn connect_with_bridges(grid: &mut TileGrid, spawn: Cell, rule: Walkability) -> f32 {
    let mut report = connectivity::check(grid, spawn, rule);
    if !report.is_fully_connected() {
        bridge_pockets(grid, &mut report, spawn);
    }
    report.ratio()
}
