// src/connectivity/repair.rs
//! Восстановление связности после генерации
//!
//! Две стратегии, обе за один проход по результату проверки:
//! - **запечатывание** (`seal_off`): каждая проходимая, но недостижимая клетка
//!   превращается в камень. Поле уменьшается, зато инвариант гарантирован.
//! - **мосты** (`bridge_pockets`): из каждого кармана прокладывается «лестница»
//!   по диагонали к точке появления. Вода на пути становится землёй, камень —
//!   кирпичом (препятствие остаётся, но его можно прострелить).
//!   `bridge_from` делает то же для одного кармана, заданного клеткой.

use super::ConnectivityReport;
use crate::grid::{Cell, TileGrid};
use crate::tile::TileKind;
use log::{debug, warn};

/// Запечатывает все недостижимые проходимые клетки камнем.
///
/// Отчёт после этого устаревает: запечатанные клетки больше не проходимы.
/// Возвращает число изменённых клеток.
pub fn seal_off(grid: &mut TileGrid, report: &ConnectivityReport) -> usize {
    let targets: Vec<Cell> = report.unreached().collect();
    for &(row, col) in &targets {
        grid.set_kind(row, col, TileKind::Stone);
    }
    if !targets.is_empty() {
        debug!("seal-off: {} unreachable tiles turned to stone", targets.len());
    }
    targets.len()
}

/// Итог прокладки мостов
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Карманы, соединённые с достижимой областью
    pub bridged: usize,
    /// Карманы, из которых путь вышел за пределы игровой области
    pub stranded: usize,
    /// Клетки, тип которых пришлось изменить
    pub carved: usize,
}

/// Соединяет каждый недостижимый карман с достижимой областью.
///
/// Отчёт обновляется на месте: пройденные клетки и соединённые карманы
/// помечаются достигнутыми.
pub fn bridge_pockets(
    grid: &mut TileGrid,
    report: &mut ConnectivityReport,
    target: Cell,
) -> BridgeSummary {
    let mut summary = BridgeSummary::default();

    for pocket in report.pockets() {
        // Путь из другого кармана уже мог пройти через этот
        if pocket.iter().any(|&cell| report.is_reached(cell)) {
            for &cell in &pocket {
                report.mark_reached(cell, true);
            }
            continue;
        }

        let Some(&start) = pocket
            .iter()
            .min_by_key(|&&(r, c)| r.abs_diff(target.0) + c.abs_diff(target.1))
        else {
            continue;
        };

        match walk_towards(grid, report, start, target) {
            Some(carved) => {
                summary.bridged += 1;
                summary.carved += carved;
                for &cell in &pocket {
                    report.mark_reached(cell, true);
                }
            }
            None => {
                summary.stranded += 1;
                warn!("bridge from {start:?} left the playable area");
            }
        }
    }

    if summary.bridged > 0 {
        debug!(
            "bridge repair: {} pockets joined, {} tiles carved",
            summary.bridged, summary.carved
        );
    }
    summary
}

/// Соединяет с достижимой областью один карман: тот, в котором лежит `start`.
///
/// Возвращает число изменённых клеток (0, если `start` уже достигнута) или
/// `None`, если `start` непроходима либо путь вышел за пределы игровой области.
pub fn bridge_from(
    grid: &mut TileGrid,
    report: &mut ConnectivityReport,
    start: Cell,
    target: Cell,
) -> Option<usize> {
    if report.is_reached(start) {
        return Some(0);
    }
    let pocket = report.pockets().into_iter().find(|p| p.contains(&start))?;
    let carved = walk_towards(grid, report, start, target)?;
    for &cell in &pocket {
        report.mark_reached(cell, true);
    }
    debug!("bridge from {start:?}: {carved} tiles carved");
    Some(carved)
}

/// Шагает от `start` к `target`, каждый раз по оси с большим остатком
/// (по равенству — по строкам), пока не встретит достигнутую клетку.
fn walk_towards(
    grid: &mut TileGrid,
    report: &mut ConnectivityReport,
    start: Cell,
    target: Cell,
) -> Option<usize> {
    let (mut row, mut col) = start;
    let mut carved = 0;

    loop {
        if (row, col) == target {
            return None;
        }
        if row.abs_diff(target.0) >= col.abs_diff(target.1) {
            row = if target.0 < row { row - 1 } else { row + 1 };
        } else {
            col = if target.1 < col { col - 1 } else { col + 1 };
        }

        if !grid.is_interior((row, col)) {
            return None;
        }
        if report.is_reached((row, col)) {
            return Some(carved);
        }

        let kind = grid.kind((row, col))?;
        let replaced = match kind {
            TileKind::Water => TileKind::Empty,
            TileKind::Stone => TileKind::Brick,
            other => other,
        };
        if replaced != kind {
            grid.set_kind(row, col, replaced);
            carved += 1;
        }
        let walkable = report.rule.allows(replaced);
        report.mark_reached((row, col), walkable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{Walkability, check};

    /// Пустое поле 9×9 со стеной и водяным кольцом вокруг кармана 3×3 в (5..=7, 5..=7)
    fn moated_pocket() -> TileGrid {
        let mut grid = TileGrid::filled(10, 10, TileKind::Empty);
        grid.enclose();
        for row in 4..=8 {
            for col in 4..=8 {
                let ring = row == 4 || row == 8 || col == 4 || col == 8;
                if ring {
                    grid.set_kind(row, col, TileKind::Water);
                }
            }
        }
        grid
    }

    #[test]
    fn seal_off_turns_water_locked_pocket_into_stone() {
        let mut grid = moated_pocket();
        let report = check(&grid, (1, 1), Walkability::Breachable);
        assert_eq!(report.unreached_count(), 9);

        assert_eq!(seal_off(&mut grid, &report), 9);
        for row in 5..=7 {
            for col in 5..=7 {
                assert_eq!(grid.kind((row, col)), Some(TileKind::Stone));
            }
        }
        let after = check(&grid, (1, 1), Walkability::Breachable);
        assert!(after.is_fully_connected());
        assert_eq!(after.unreached().count(), 0);
    }

    #[test]
    fn bridge_crosses_water_and_softens_stone() {
        let mut grid = moated_pocket();
        grid.set_kind(3, 3, TileKind::Stone);
        let mut report = check(&grid, (1, 1), Walkability::Breachable);

        let summary = bridge_pockets(&mut grid, &mut report, (1, 1));
        assert_eq!(summary.bridged, 1);
        assert_eq!(summary.stranded, 0);
        assert!(report.is_fully_connected());
        // из (5,5): шаг по строке в (4,5), затем по столбцу в (4,4)
        assert_eq!(grid.kind((4, 5)), Some(TileKind::Empty));
        assert_eq!(grid.kind((4, 4)), Some(TileKind::Empty));
        assert_eq!(summary.carved, 2);

        let after = check(&grid, (1, 1), Walkability::Breachable);
        assert!(after.is_fully_connected());
    }

    #[test]
    fn bridge_converts_stone_to_brick_on_its_way() {
        let mut grid = TileGrid::filled(7, 7, TileKind::Empty);
        grid.enclose();
        for col in 1..6 {
            grid.set_kind(3, col, TileKind::Stone);
        }
        let mut report = check(&grid, (1, 1), Walkability::Breachable);
        let summary = bridge_pockets(&mut grid, &mut report, (1, 1));

        assert_eq!(summary.bridged, 1);
        assert_eq!(summary.carved, 1);
        assert_eq!(grid.count(TileKind::Brick), 1);
        assert!(check(&grid, (1, 1), Walkability::Breachable).is_fully_connected());
    }

    #[test]
    fn bridge_from_joins_only_the_requested_pocket() {
        let mut grid = moated_pocket();
        let mut report = check(&grid, (1, 1), Walkability::Breachable);

        assert_eq!(bridge_from(&mut grid, &mut report, (2, 2), (1, 1)), Some(0));
        assert_eq!(bridge_from(&mut grid, &mut report, (4, 4), (1, 1)), None);
        // из (7,7) лестница идёт через карман и пробивает кольцо в (4,5) и (4,4)
        assert_eq!(bridge_from(&mut grid, &mut report, (7, 7), (1, 1)), Some(2));
        assert!(report.is_fully_connected());

        assert_eq!(seal_off(&mut grid, &report), 0);
        for row in 5..=7 {
            for col in 5..=7 {
                assert_eq!(grid.kind((row, col)), Some(TileKind::Empty));
            }
        }
        assert!(check(&grid, (1, 1), Walkability::Breachable).is_fully_connected());
    }
}
