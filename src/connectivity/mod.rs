// src/connectivity/mod.rs
//! Проверка достижимости клеток от точки появления
//!
//! Обход в ширину (BFS) по четырём направлениям от стартовой клетки по клеткам,
//! которые считаются «проходимыми» согласно явному правилу `Walkability`.
//! Правило — параметр проверки, а не свойство генератора: разные генераторы
//! передают своё.
//!
//! Результат (`ConnectivityReport`) хранит множество посещённых клеток и
//! счётчики «всего проходимых» / «достигнуто», а также умеет разбивать
//! недостижимые клетки на связные «карманы» (`pockets`).

pub mod repair;

use crate::grid::{Cell, TileGrid};
use crate::tile::TileKind;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub use repair::{bridge_from, bridge_pockets, seal_off};

/// Правило, по которому клетка считается проходимой при заливке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Walkability {
    /// Только то, по чему танк едет прямо сейчас: `Empty`, `Grass`
    TankPassable,
    /// Всё, кроме `Stone` и `Water`: кирпич можно прострелить
    #[default]
    Breachable,
    /// Всё, кроме `Stone`: вода учитывается как часть поля
    NonStone,
}

impl Walkability {
    #[must_use]
    pub fn allows(self, kind: TileKind) -> bool {
        match self {
            Walkability::TankPassable => kind.tank_passable(),
            Walkability::Breachable => !matches!(kind, TileKind::Stone | TileKind::Water),
            Walkability::NonStone => kind != TileKind::Stone,
        }
    }
}

/// Результат заливки
#[derive(Debug, Clone)]
pub struct ConnectivityReport {
    pub rule: Walkability,
    pub start: Cell,
    cols: usize,
    walkable: Vec<bool>,
    visited: Vec<bool>,
    walkable_count: usize,
    reached_count: usize,
}

/// Заливка от `start` по клеткам, разрешённым правилом `rule`.
///
/// Если стартовая клетка вне сетки или непроходима, не достигнуто ничего.
#[must_use]
pub fn check(grid: &TileGrid, start: Cell, rule: Walkability) -> ConnectivityReport {
    let walkable: Vec<bool> = grid.tiles().map(|t| rule.allows(t.kind())).collect();
    let walkable_count = walkable.iter().filter(|&&w| w).count();
    let mut visited = vec![false; grid.len()];
    let mut reached_count = 0;

    let start_ok = grid.kind(start).is_some_and(|k| rule.allows(k));
    if start_ok {
        let mut queue = VecDeque::new();
        visited[grid.index(start)] = true;
        reached_count += 1;
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for next in grid.neighbors4(cell) {
                let nidx = grid.index(next);
                if walkable[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    reached_count += 1;
                    queue.push_back(next);
                }
            }
        }
    }

    ConnectivityReport {
        rule,
        start,
        cols: grid.cols(),
        walkable,
        visited,
        walkable_count,
        reached_count,
    }
}

impl ConnectivityReport {
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.walkable_count
    }

    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.reached_count
    }

    #[must_use]
    pub fn unreached_count(&self) -> usize {
        self.walkable_count - self.reached_count
    }

    /// Доля достигнутых среди проходимых; пустое поле считается связным
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.walkable_count == 0 {
            1.0
        } else {
            self.reached_count as f32 / self.walkable_count as f32
        }
    }

    #[must_use]
    pub fn is_fully_connected(&self) -> bool {
        self.reached_count == self.walkable_count
    }

    #[must_use]
    pub fn is_reached(&self, (row, col): Cell) -> bool {
        col < self.cols && self.visited.get(row * self.cols + col).copied().unwrap_or(false)
    }

    pub(crate) fn mark_reached(&mut self, (row, col): Cell, walkable_now: bool) {
        let idx = row * self.cols + col;
        if !self.walkable[idx] && walkable_now {
            self.walkable[idx] = true;
            self.walkable_count += 1;
        }
        if !self.visited[idx] {
            self.visited[idx] = true;
            if self.walkable[idx] {
                self.reached_count += 1;
            }
        }
    }

    /// Проходимые, но недостижимые клетки в порядке обхода сетки
    pub fn unreached(&self) -> impl Iterator<Item = Cell> + '_ {
        self.walkable
            .iter()
            .zip(&self.visited)
            .enumerate()
            .filter(|(_, (w, v))| **w && !**v)
            .map(|(idx, _)| (idx / self.cols, idx % self.cols))
    }

    /// Недостижимые клетки, сгруппированные в связные по 4 направлениям карманы.
    ///
    /// Порядок карманов детерминирован: по наименьшему индексу клетки.
    #[must_use]
    pub fn pockets(&self) -> Vec<Vec<Cell>> {
        let total = self.walkable.len();
        if self.cols == 0 || total == 0 {
            return Vec::new();
        }
        let rows = total / self.cols;
        let open = |idx: usize| self.walkable[idx] && !self.visited[idx];

        let mut sets = UnionFind::<usize>::new(total);
        for idx in (0..total).filter(|&i| open(i)) {
            let (row, col) = (idx / self.cols, idx % self.cols);
            if col + 1 < self.cols && open(idx + 1) {
                sets.union(idx, idx + 1);
            }
            if row + 1 < rows && open(idx + self.cols) {
                sets.union(idx, idx + self.cols);
            }
        }

        let mut groups: BTreeMap<usize, Vec<Cell>> = BTreeMap::new();
        let mut first_seen: BTreeMap<usize, usize> = BTreeMap::new();
        for idx in (0..total).filter(|&i| open(i)) {
            let root = sets.find(idx);
            let key = *first_seen.entry(root).or_insert(idx);
            groups
                .entry(key)
                .or_default()
                .push((idx / self.cols, idx % self.cols));
        }
        groups.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Поле 7×7: стена по краю, вертикальная каменная перегородка в столбце 3
    fn split_grid() -> TileGrid {
        let mut grid = TileGrid::filled(7, 7, TileKind::Empty);
        grid.enclose();
        for row in 1..6 {
            grid.set_kind(row, 3, TileKind::Stone);
        }
        grid
    }

    #[test]
    fn flood_fill_stops_at_blocking_tiles() {
        let grid = split_grid();
        let report = check(&grid, (1, 1), Walkability::Breachable);
        assert_eq!(report.walkable_count(), 20);
        assert_eq!(report.reached_count(), 10);
        assert!((report.ratio() - 0.5).abs() < f32::EPSILON);
        assert!(report.is_reached((5, 2)));
        assert!(!report.is_reached((5, 4)));
    }

    #[test]
    fn rule_decides_whether_water_and_brick_connect() {
        let mut grid = split_grid();
        grid.set_kind(2, 3, TileKind::Water);
        grid.set_kind(4, 3, TileKind::Brick);

        assert!(check(&grid, (1, 1), Walkability::Breachable).is_fully_connected());
        assert!(check(&grid, (1, 1), Walkability::NonStone).is_fully_connected());
        let strict = check(&grid, (1, 1), Walkability::TankPassable);
        assert_eq!(strict.reached_count(), 10);
    }

    #[test]
    fn blocked_start_reaches_nothing() {
        let grid = split_grid();
        let report = check(&grid, (0, 0), Walkability::Breachable);
        assert_eq!(report.reached_count(), 0);
        assert_eq!(report.unreached().count(), 20);
        let report = check(&grid, (40, 40), Walkability::Breachable);
        assert_eq!(report.reached_count(), 0);
    }

    #[test]
    fn pockets_group_unreached_cells_by_adjacency() {
        let mut grid = split_grid();
        // делим правую половину ещё раз: два отдельных кармана
        grid.set_kind(3, 4, TileKind::Stone);
        grid.set_kind(3, 5, TileKind::Stone);
        let report = check(&grid, (1, 1), Walkability::Breachable);
        let pockets = report.pockets();
        assert_eq!(pockets.len(), 2);
        assert_eq!(pockets[0], vec![(1, 4), (1, 5), (2, 4), (2, 5)]);
        assert_eq!(pockets[1].len(), 4);
    }
}
