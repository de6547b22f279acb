// src/grid.rs
//! Сетка поля боя
//!
//! `TileGrid` — прямоугольный массив клеток фиксированного размера. Размеры задаются
//! при создании и не меняются до конца уровня. Индекс клетки вычисляется как
//! `row * cols + col`.
//!
//! Выход за границы при чтении не является ошибкой: многие алгоритмы опрашивают
//! соседей у самого края, поэтому `get`/`kind_at` возвращают `None`.

use crate::tile::{Tile, TileKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Координата клетки `(row, col)`
pub type Cell = (usize, usize);

/// Четыре направления сдвига `(d_row, d_col)`
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Прямоугольник в координатах сетки: `x` — столбец, `y` — строка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    #[must_use]
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Геометрический центр как клетка `(row, col)`
    #[must_use]
    pub fn center(&self) -> Cell {
        (self.y + self.height / 2, self.x + self.width / 2)
    }

    #[must_use]
    pub fn contains(&self, (row, col): Cell) -> bool {
        row >= self.y && row < self.y + self.height && col >= self.x && col < self.x + self.width
    }

    /// Клетка лежит на внешнем кольце прямоугольника
    #[must_use]
    pub fn on_edge(&self, (row, col): Cell) -> bool {
        self.contains((row, col))
            && (row == self.y
                || col == self.x
                || row + 1 == self.y + self.height
                || col + 1 == self.x + self.width)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |row| (self.x..self.x + self.width).map(move |col| (row, col)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Полностью каменная сетка — стартовый холст для BSP и лабиринтов
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, TileKind::Stone)
    }

    #[must_use]
    pub fn filled(rows: usize, cols: usize, kind: TileKind) -> Self {
        let tiles = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Tile::new(row, col, kind)))
            .collect();
        Self { rows, cols, tiles }
    }

    /// Восстанавливает сетку из матрицы кодов (строка за строкой).
    ///
    /// Возвращает `None`, если строки разной длины или встречен неизвестный код.
    #[must_use]
    pub fn from_codes(codes: &[Vec<u8>]) -> Option<Self> {
        let rows = codes.len();
        let cols = codes.first().map_or(0, Vec::len);
        let mut grid = Self::filled(rows, cols, TileKind::Empty);
        for (row, line) in codes.iter().enumerate() {
            if line.len() != cols {
                return None;
            }
            for (col, &code) in line.iter().enumerate() {
                grid.set_kind(row, col, TileKind::from_code(code)?);
            }
        }
        Some(grid)
    }

    #[must_use]
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.tiles
            .chunks(self.cols.max(1))
            .map(|line| line.iter().map(|t| t.kind().code()).collect())
            .collect()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn index(&self, (row, col): Cell) -> usize {
        row * self.cols + col
    }

    #[must_use]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Клетка не лежит на внешней стене
    #[must_use]
    pub fn is_interior(&self, (row, col): Cell) -> bool {
        row >= 1 && col >= 1 && row + 1 < self.rows && col + 1 < self.cols
    }

    /// Игровая область: вся сетка без однотайловой внешней стены
    #[must_use]
    pub fn playable_area(&self) -> Rect {
        Rect::new(
            1,
            1,
            self.cols.saturating_sub(2),
            self.rows.saturating_sub(2),
        )
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        if row < self.rows && col < self.cols {
            Some(&self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    #[must_use]
    pub fn kind(&self, (row, col): Cell) -> Option<TileKind> {
        self.get(row, col).map(Tile::kind)
    }

    /// Тип клетки по знаковым координатам (удобно для опроса соседей у края)
    #[must_use]
    pub fn kind_at(&self, row: i32, col: i32) -> Option<TileKind> {
        if self.contains(row, col) {
            self.kind((row as usize, col as usize))
        } else {
            None
        }
    }

    /// Меняет тип клетки. Координаты обязан проверить вызывающий.
    ///
    /// # Panics
    /// Паникует при выходе за границы сетки.
    pub fn set_kind(&mut self, row: usize, col: usize, kind: TileKind) {
        assert!(
            row < self.rows && col < self.cols,
            "set_kind out of bounds: ({row}, {col}) in {}x{}",
            self.rows,
            self.cols
        );
        let idx = row * self.cols + col;
        self.tiles[idx].set_kind(kind);
    }

    /// Разрушение клетки снарядом. Вне сетки и для неразрушимых типов — no-op.
    pub fn destroy(&mut self, row: usize, col: usize) -> bool {
        if row < self.rows && col < self.cols {
            let idx = row * self.cols + col;
            self.tiles[idx].destroy()
        } else {
            false
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, kind: TileKind) {
        for (row, col) in rect.cells() {
            if row < self.rows && col < self.cols {
                self.set_kind(row, col, kind);
            }
        }
    }

    /// Обносит сетку каменной стеной толщиной в одну клетку
    pub fn enclose(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if !self.is_interior((row, col)) {
                    self.set_kind(row, col, TileKind::Stone);
                }
            }
        }
    }

    /// Соседи по четырём направлениям внутри сетки
    pub fn neighbors4(&self, (row, col): Cell) -> impl Iterator<Item = Cell> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let nr = row as i32 + dr;
            let nc = col as i32 + dc;
            self.contains(nr, nc).then_some((nr as usize, nc as usize))
        })
    }

    /// Есть ли в окрестности 3×3 (включая саму клетку) клетка указанного типа
    #[must_use]
    pub fn near_kind(&self, (row, col): Cell, kind: TileKind) -> bool {
        (-1..=1).any(|dr| {
            (-1..=1).any(|dc| self.kind_at(row as i32 + dr, col as i32 + dc) == Some(kind))
        })
    }

    /// Количество из 8 соседей, имеющих указанный тип (клетки вне сетки не считаются)
    #[must_use]
    pub fn count_neighbors8(&self, (row, col): Cell, kind: TileKind) -> usize {
        let mut count = 0;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if (dr, dc) != (0, 0) && self.kind_at(row as i32 + dr, col as i32 + dc) == Some(kind) {
                    count += 1;
                }
            }
        }
        count
    }

    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind() == kind).count()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.tiles.chunks(self.cols.max(1)) {
            let text: String = line.iter().map(|t| t.kind().glyph()).collect();
            writeln!(f, "{text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_solid_stone() {
        let grid = TileGrid::new(22, 30);
        assert_eq!(grid.len(), 660);
        assert_eq!(grid.count(TileKind::Stone), 660);
        let tile = grid.get(21, 29).unwrap();
        assert_eq!((tile.row, tile.col), (21, 29));
    }

    #[test]
    fn out_of_bounds_reads_return_none() {
        let grid = TileGrid::new(4, 5);
        assert!(grid.get(4, 0).is_none());
        assert!(grid.get(0, 5).is_none());
        assert_eq!(grid.kind_at(-1, 2), None);
        assert_eq!(grid.kind_at(2, -1), None);
        assert_eq!(grid.neighbors4((0, 0)).count(), 2);
    }

    #[test]
    fn zero_column_grid_never_divides_by_width() {
        let mut grid = TileGrid::new(3, 0);
        assert!(grid.is_empty());
        assert!(grid.get(0, 0).is_none());
        assert_eq!(grid.kind_at(0, 0), None);
        assert!(grid.to_codes().is_empty());
        grid.enclose();
        assert!(!grid.destroy(0, 0));
    }

    #[test]
    fn destroy_turns_brick_into_passable_ground() {
        let mut grid = TileGrid::filled(3, 3, TileKind::Empty);
        grid.set_kind(1, 1, TileKind::Brick);
        assert!(grid.destroy(1, 1));
        assert!(!grid.destroy(1, 1));
        assert!(!grid.destroy(7, 7));
        let tile = grid.get(1, 1).unwrap();
        assert!(tile.tank_passable() && tile.bullet_passable() && tile.is_destroyed());
    }

    #[test]
    fn code_matrix_round_trips_and_rejects_garbage() {
        let mut grid = TileGrid::filled(2, 3, TileKind::Empty);
        grid.set_kind(0, 1, TileKind::Water);
        grid.set_kind(1, 2, TileKind::Grass);
        assert_eq!(grid.to_codes(), vec![vec![0, 3, 0], vec![0, 0, 4]]);
        assert_eq!(TileGrid::from_codes(&grid.to_codes()), Some(grid));
        assert!(TileGrid::from_codes(&[vec![0, 1], vec![0]]).is_none());
        assert!(TileGrid::from_codes(&[vec![0, 7]]).is_none());
    }

    #[test]
    fn enclose_builds_outer_wall_only() {
        let mut grid = TileGrid::filled(4, 4, TileKind::Empty);
        grid.enclose();
        assert_eq!(grid.count(TileKind::Stone), 12);
        assert_eq!(grid.kind((1, 2)), Some(TileKind::Empty));
        assert_eq!(grid.playable_area(), Rect::new(1, 1, 2, 2));
        assert_eq!(grid.to_string(), "@@@@\n@..@\n@..@\n@@@@\n");
    }
}
