// src/query.rs
//! Запросы игровой симуляции в пиксельных координатах
//!
//! Танки и снаряды живут в пикселях; клетка находится целочисленным делением на
//! размер тайла. Всё, что лежит за пределами сетки, ведёт себя как внешняя
//! каменная стена: непроходимо и отражает снаряды.

use crate::grid::{Cell, TileGrid};
use crate::tile::{Tile, TileKind};

/// Представление сетки для симуляции: сетка плюс размер тайла в пикселях
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    grid: &'a TileGrid,
    tile_size: u32,
}

impl<'a> PixelView<'a> {
    #[must_use]
    pub fn new(grid: &'a TileGrid, tile_size: u32) -> Self {
        Self {
            grid,
            tile_size: tile_size.max(1),
        }
    }

    /// Клетка под пикселем, `None` за пределами сетки
    #[must_use]
    pub fn cell_at(&self, px: i32, py: i32) -> Option<Cell> {
        if px < 0 || py < 0 {
            return None;
        }
        let col = px as u32 / self.tile_size;
        let row = py as u32 / self.tile_size;
        self.grid
            .get(row as usize, col as usize)
            .map(|t| (t.row, t.col))
    }

    #[must_use]
    pub fn tile_at(&self, px: i32, py: i32) -> Option<&'a Tile> {
        let (row, col) = self.cell_at(px, py)?;
        self.grid.get(row, col)
    }

    fn kind_or_wall(&self, px: i32, py: i32) -> TileKind {
        self.tile_at(px, py).map_or(TileKind::Stone, Tile::kind)
    }

    #[must_use]
    pub fn can_tank_pass(&self, px: i32, py: i32) -> bool {
        self.kind_or_wall(px, py).tank_passable()
    }

    #[must_use]
    pub fn can_bullet_pass(&self, px: i32, py: i32) -> bool {
        self.kind_or_wall(px, py).bullet_passable()
    }

    #[must_use]
    pub fn should_bullet_reflect(&self, px: i32, py: i32) -> bool {
        self.kind_or_wall(px, py).reflects_bullet()
    }

    #[must_use]
    pub fn is_hidden(&self, px: i32, py: i32) -> bool {
        self.kind_or_wall(px, py).provides_cover()
    }

    /// Все четыре угла габарита сущности стоят на проходимых для танка клетках
    #[must_use]
    pub fn is_position_safe(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        let right = x + width.max(1) - 1;
        let bottom = y + height.max(1) - 1;
        [(x, y), (right, y), (x, bottom), (right, bottom)]
            .iter()
            .all(|&(px, py)| self.can_tank_pass(px, py))
    }
}
