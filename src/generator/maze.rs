// src/generator/maze.rs
//! Лабиринт поиском в глубину с возвратом
//!
//! Лабиринт строится на логической сетке, где одна логическая клетка занимает
//! `block_size × block_size` тайлов (1 или 2). Клетки лежат на нечётных
//! логических координатах, стены — между ними, поэтому шаг обхода равен двум.
//!
//! ## Этапы
//!
//! 1. Обход в глубину от логической клетки (1,1) с явным стеком: вырезается
//!    сама клетка и стена до неё
//! 2. При возврате из клетки её уже посещённые соседи с малой вероятностью
//!    соединяются пробитой стеной — так появляются петли
//! 3. Очистка безопасной зоны и проверка связности (повтор попытки при неудаче)
//! 4. Убранство по степени клетки: в прямом коридоре — кирпичная полоса вдоль
//!    прохода, на развилке — одиночный кирпич в одном из тайлов. Клетка никогда не
//!    запечатывается полностью, поэтому этап идёт после проверки

use super::carve::{chance, clear_zone, spawn_zone};
use super::{Generation, MapGenerator, retry_until_connected};
use crate::config::{GeneratorKind, MazeSettings, SpawnSettings};
use crate::grid::{Cell, Rect, TileGrid};
use crate::tile::TileKind;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Шаги к соседним клеткам: север, юг, запад, восток
const STEPS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone)]
pub struct BacktrackingMaze {
    settings: MazeSettings,
    spawn: SpawnSettings,
}

/// Логическая сетка поверх физической
#[derive(Debug, Clone, Copy)]
struct Lattice {
    block: usize,
    rows: usize,
    cols: usize,
}

impl Lattice {
    fn new(rows: usize, cols: usize, block: usize) -> Self {
        Self {
            block,
            rows: rows / block,
            cols: cols / block,
        }
    }

    /// Логическая клетка может быть вырезана (не касается внешней стены)
    fn is_cell(&self, (i, j): Cell) -> bool {
        i % 2 == 1 && j % 2 == 1 && i + 1 < self.rows && j + 1 < self.cols
    }

    fn rect(&self, (i, j): Cell) -> Rect {
        Rect::new(j * self.block, i * self.block, self.block, self.block)
    }

    fn offset(&self, (i, j): Cell, (di, dj): (i32, i32), scale: i32) -> Option<Cell> {
        let ni = i as i32 + di * scale;
        let nj = j as i32 + dj * scale;
        (ni >= 0 && nj >= 0).then_some((ni as usize, nj as usize))
    }

    fn index(&self, (i, j): Cell) -> usize {
        i * self.cols + j
    }

    fn is_open(&self, grid: &TileGrid, cell: Cell) -> bool {
        let rect = self.rect(cell);
        grid.kind((rect.y, rect.x))
            .is_some_and(|k| k != TileKind::Stone)
    }

    /// Направления, в которых стена клетки пробита
    fn open_sides(&self, grid: &TileGrid, cell: Cell) -> Vec<(i32, i32)> {
        STEPS
            .iter()
            .copied()
            .filter(|&step| {
                self.offset(cell, step, 1)
                    .is_some_and(|wall| self.is_open(grid, wall))
            })
            .collect()
    }
}

impl BacktrackingMaze {
    #[must_use]
    pub fn new(settings: MazeSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    fn lattice(&self, rows: usize, cols: usize) -> Lattice {
        Lattice::new(rows, cols, self.settings.block_size.clamp(1, 2))
    }

    /// Одна попытка: вырезанный лабиринт с открытой зоной появления, без убранства
    pub fn carve(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> TileGrid {
        let mut grid = TileGrid::new(rows, cols);
        let lattice = self.lattice(rows, cols);

        let start = (1, 1);
        if lattice.is_cell(start) {
            let mut visited = vec![false; lattice.rows * lattice.cols];
            let mut stack = vec![start];
            visited[lattice.index(start)] = true;
            grid.fill_rect(lattice.rect(start), TileKind::Empty);

            while let Some(&cell) = stack.last() {
                let fresh: Vec<(i32, i32)> = STEPS
                    .iter()
                    .copied()
                    .filter(|&step| {
                        lattice
                            .offset(cell, step, 2)
                            .is_some_and(|n| lattice.is_cell(n) && !visited[lattice.index(n)])
                    })
                    .collect();

                if fresh.is_empty() {
                    stack.pop();
                    self.inject_loops(&mut grid, &lattice, cell, rng);
                    continue;
                }

                let step = fresh[rng.gen_range(0..fresh.len())];
                let (Some(wall), Some(next)) =
                    (lattice.offset(cell, step, 1), lattice.offset(cell, step, 2))
                else {
                    continue;
                };
                visited[lattice.index(next)] = true;
                grid.fill_rect(lattice.rect(wall), TileKind::Empty);
                grid.fill_rect(lattice.rect(next), TileKind::Empty);
                stack.push(next);
            }
        }

        let zone = spawn_zone(&grid, self.spawn.cell, self.spawn.zone);
        clear_zone(&mut grid, zone);
        grid
    }

    /// Пробивает стены к уже вырезанным соседям с вероятностью `loop_chance`
    fn inject_loops(&self, grid: &mut TileGrid, lattice: &Lattice, cell: Cell, rng: &mut ChaCha8Rng) {
        for step in STEPS {
            let (Some(wall), Some(next)) = (lattice.offset(cell, step, 1), lattice.offset(cell, step, 2))
            else {
                continue;
            };
            if lattice.is_cell(next)
                && lattice.is_open(grid, next)
                && !lattice.is_open(grid, wall)
                && chance(rng, self.settings.loop_chance)
            {
                grid.fill_rect(lattice.rect(wall), TileKind::Empty);
            }
        }
    }

    /// Кирпичное убранство по степени связности клеток (только для блоков 2×2)
    pub fn decorate(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        let lattice = self.lattice(grid.rows(), grid.cols());
        if lattice.block < 2 {
            return;
        }
        let spawn = spawn_zone(grid, self.spawn.cell, self.spawn.zone);

        for i in 0..lattice.rows {
            for j in 0..lattice.cols {
                let cell = (i, j);
                if !lattice.is_cell(cell) || !lattice.is_open(grid, cell) {
                    continue;
                }
                let rect = lattice.rect(cell);
                if rect.cells().any(|c| spawn.contains(c)) {
                    continue;
                }
                let sides = lattice.open_sides(grid, cell);
                let straight = sides.len() == 2 && sides[0].0 == -sides[1].0 && sides[0].1 == -sides[1].1;

                if straight && chance(rng, self.settings.bar_chance) {
                    // полоса вдоль прохода: вторая половина клетки остаётся открытой
                    let bar = if sides[0].0 == 0 {
                        // проход запад-восток: занимаем верхнюю или нижнюю строку
                        Rect::new(rect.x, rect.y + rng.gen_range(0..rect.height), rect.width, 1)
                    } else {
                        Rect::new(rect.x + rng.gen_range(0..rect.width), rect.y, 1, rect.height)
                    };
                    grid.fill_rect(bar, TileKind::Brick);
                } else if sides.len() >= 3 && chance(rng, self.settings.blocker_chance) {
                    let row = rect.y + rng.gen_range(0..rect.height);
                    let col = rect.x + rng.gen_range(0..rect.width);
                    grid.set_kind(row, col, TileKind::Brick);
                }
            }
        }
    }
}

impl MapGenerator for BacktrackingMaze {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::BacktrackingMaze
    }

    fn tolerance(&self) -> f32 {
        1.0 - self.settings.accept_ratio
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        let result = retry_until_connected(
            self.kind(),
            self.settings.max_attempts,
            self.settings.accept_ratio,
            self.spawn.cell,
            self.walkability(),
            rng,
            |rng| self.carve(rows, cols, rng),
        );
        match result {
            Ok(mut map) => {
                self.decorate(&mut map.grid, rng);
                Ok(map)
            }
            Err(mut degraded) => {
                self.decorate(&mut degraded.0.grid, rng);
                Err(degraded)
            }
        }
    }
}
