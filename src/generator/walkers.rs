// src/generator/walkers.rs
//! Лабиринт из нескольких независимых копателей
//!
//! Каждый копатель делает заданное число шагов в случайном направлении и
//! вырезает кисть 1×1 или 2×2 в каждой посещённой клетке. У стены копатель
//! отскакивает назад. Первый копатель стартует в точке появления, остальные —
//! в случайных местах, поэтому связность не гарантирована и проверяется
//! после каждой попытки.

use super::carve::{chance, clear_zone, spawn_zone};
use super::{Generation, MapGenerator, retry_until_connected};
use crate::config::{GeneratorKind, SpawnSettings, WalkerSettings};
use crate::grid::{Cell, DIRECTIONS, TileGrid};
use crate::tile::TileKind;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct WalkerMaze {
    settings: WalkerSettings,
    spawn: SpawnSettings,
}

impl WalkerMaze {
    #[must_use]
    pub fn new(settings: WalkerSettings, spawn: SpawnSettings) -> Self {
        Self { settings, spawn }
    }

    /// Кисть целиком помещается внутри стены
    fn fits(grid: &TileGrid, (row, col): Cell, brush: usize) -> bool {
        row >= 1 && col >= 1 && row + brush < grid.rows() && col + brush < grid.cols()
    }

    fn stamp(&self, grid: &mut TileGrid, (row, col): Cell, brush: usize, rng: &mut ChaCha8Rng) {
        for r in row..row + brush {
            for c in col..col + brush {
                if grid.kind((r, c)) == Some(TileKind::Stone) {
                    let kind = if chance(rng, self.settings.brick_chance) {
                        TileKind::Brick
                    } else {
                        TileKind::Empty
                    };
                    grid.set_kind(r, c, kind);
                }
            }
        }
    }

    fn walk(&self, grid: &mut TileGrid, start: Cell, brush: usize, rng: &mut ChaCha8Rng) {
        let mut pos = start;
        for _ in 0..self.settings.steps {
            self.stamp(grid, pos, brush, rng);

            let (dr, dc) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
            let forward = (pos.0 as i32 + dr, pos.1 as i32 + dc);
            let back = (pos.0 as i32 - dr, pos.1 as i32 - dc);
            for (r, c) in [forward, back] {
                if r >= 0 && c >= 0 && Self::fits(grid, (r as usize, c as usize), brush) {
                    pos = (r as usize, c as usize);
                    break;
                }
            }
        }
    }

    /// Редкая вода и чуть более частая трава на уже вырезанной земле
    fn scatter(&self, grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
        let zone = spawn_zone(grid, self.spawn.cell, self.spawn.zone);
        for row in 1..grid.rows().saturating_sub(1) {
            for col in 1..grid.cols().saturating_sub(1) {
                if zone.contains((row, col)) || grid.kind((row, col)) != Some(TileKind::Empty) {
                    continue;
                }
                if chance(rng, self.settings.water_chance) {
                    grid.set_kind(row, col, TileKind::Water);
                } else if chance(rng, self.settings.grass_chance) {
                    grid.set_kind(row, col, TileKind::Grass);
                }
            }
        }
    }

    /// Одна попытка целиком: копатели, убранство, безопасная зона
    pub fn carve(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> TileGrid {
        let mut grid = TileGrid::new(rows, cols);
        let brush = self.settings.brush.clamp(1, 2);

        if rows > brush + 1 && cols > brush + 1 {
            let last_row = rows - 1 - brush;
            let last_col = cols - 1 - brush;
            for n in 0..self.settings.walkers {
                let start = if n == 0 {
                    (
                        self.spawn.cell.0.clamp(1, last_row),
                        self.spawn.cell.1.clamp(1, last_col),
                    )
                } else {
                    (rng.gen_range(1..=last_row), rng.gen_range(1..=last_col))
                };
                self.walk(&mut grid, start, brush, rng);
            }
        }

        self.scatter(&mut grid, rng);
        let zone = spawn_zone(&grid, self.spawn.cell, self.spawn.zone);
        clear_zone(&mut grid, zone);
        grid
    }
}

impl MapGenerator for WalkerMaze {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::WalkerMaze
    }

    fn tolerance(&self) -> f32 {
        1.0 - self.settings.accept_ratio
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation {
        retry_until_connected(
            self.kind(),
            self.settings.max_attempts,
            self.settings.accept_ratio,
            self.spawn.cell,
            self.walkability(),
            rng,
            |rng| self.carve(rows, cols, rng),
        )
    }
}
