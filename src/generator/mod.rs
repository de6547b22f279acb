// src/generator/mod.rs
//! Семейство генераторов поля боя
//!
//! Все стратегии реализуют один трейт `MapGenerator` и выбираются тегом
//! `GeneratorKind`. Каждая стратегия отвечает за свой инвариант связности:
//! - BSP-генераторы после вырезания прокладывают мосты из изолированных карманов
//! - открытое поле запечатывает недостижимые клетки камнем
//! - лабиринты перегенерируются целиком, пока доля достижимых клеток не станет
//!   не ниже порога; если бюджет попыток исчерпан, возвращается последняя
//!   попытка как `Err(DegradedMap)` — пригодная, но не дотянувшая до порога карта

mod battlefield;
mod bsp;
mod carve;
mod corridors;
mod maze;
mod walkers;

pub use battlefield::{BattlefieldGenerator, Bunker, RiverPath, RiverSegment};
pub use bsp::{BspLayout, Corridor, RoomsAndCorridors, StrictBsp};
pub use carve::{carve_l_corridor, spawn_zone};
pub use corridors::CorridorsOnly;
pub use maze::BacktrackingMaze;
pub use walkers::WalkerMaze;

use crate::config::{GeneratorKind, MapConfig};
use crate::connectivity::{self, Walkability};
use crate::grid::{Cell, TileGrid};
use log::{debug, warn};
use rand_chacha::ChaCha8Rng;

/// Готовая карта и сведения о том, как она получена
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMap {
    pub kind: GeneratorKind,
    pub grid: TileGrid,
    /// Сколько попыток генерации понадобилось (1 для генераторов без повторов)
    pub attempts: usize,
    /// Доля достижимых от точки появления клеток по правилу генератора
    pub reachable_ratio: f32,
}

/// Карта, не достигшая порога связности за отведённые попытки
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedMap(pub GeneratedMap);

impl DegradedMap {
    #[must_use]
    pub fn into_inner(self) -> GeneratedMap {
        self.0
    }
}

/// `Ok` — карта удовлетворяет порогу, `Err` — лучшее, что удалось получить
pub type Generation = Result<GeneratedMap, DegradedMap>;

/// Общая способность: построить сетку заданного размера
pub trait MapGenerator {
    fn kind(&self) -> GeneratorKind;

    /// Правило проходимости, по которому генератор проверяет связность
    fn walkability(&self) -> Walkability {
        Walkability::Breachable
    }

    /// Допустимая доля недостижимых проходимых клеток
    fn tolerance(&self) -> f32 {
        0.0
    }

    fn generate(&self, rows: usize, cols: usize, rng: &mut ChaCha8Rng) -> Generation;
}

/// Создаёт генератор нужного вида из общей конфигурации
#[must_use]
pub fn build_generator(config: &MapConfig, kind: GeneratorKind) -> Box<dyn MapGenerator> {
    let spawn = config.spawn.clone();
    match kind {
        GeneratorKind::RoomsAndCorridors => {
            Box::new(RoomsAndCorridors::new(config.bsp.clone(), spawn))
        }
        GeneratorKind::CorridorsOnly => Box::new(CorridorsOnly::new(config.bsp.clone(), spawn)),
        GeneratorKind::StrictBsp => Box::new(StrictBsp::new(config.bsp.clone(), spawn)),
        GeneratorKind::BacktrackingMaze => {
            Box::new(BacktrackingMaze::new(config.maze.clone(), spawn))
        }
        GeneratorKind::WalkerMaze => Box::new(WalkerMaze::new(config.walkers.clone(), spawn)),
        GeneratorKind::Battlefield => {
            Box::new(BattlefieldGenerator::new(config.battlefield.clone(), spawn))
        }
    }
}

/// Генерирует карту по конфигурации: вид генератора и сид берутся из неё
#[must_use]
pub fn generate(config: &MapConfig) -> Generation {
    let mut rng = config.rng();
    build_generator(config, config.generator).generate(config.rows, config.cols, &mut rng)
}

/// Полная перегенерация до достижения порога связности.
///
/// Каждая попытка проверяется заливкой от `spawn`. Первая попытка с долей
/// достижимых `>= accept_ratio` принимается сразу; иначе возвращается последняя.
pub(crate) fn retry_until_connected<F>(
    kind: GeneratorKind,
    max_attempts: usize,
    accept_ratio: f32,
    spawn: Cell,
    rule: Walkability,
    rng: &mut ChaCha8Rng,
    mut attempt: F,
) -> Generation
where
    F: FnMut(&mut ChaCha8Rng) -> TileGrid,
{
    let max_attempts = max_attempts.max(1);
    let mut last = None;

    for n in 1..=max_attempts {
        let grid = attempt(rng);
        let ratio = connectivity::check(&grid, spawn, rule).ratio();
        let map = GeneratedMap {
            kind,
            grid,
            attempts: n,
            reachable_ratio: ratio,
        };
        if ratio >= accept_ratio {
            debug!("{}: accepted attempt {n} with ratio {ratio:.3}", kind.name());
            return Ok(map);
        }
        last = Some(map);
    }

    // max_attempts >= 1, поэтому хотя бы одна попытка есть
    let map = last.unwrap_or_else(|| GeneratedMap {
        kind,
        grid: TileGrid::new(0, 0),
        attempts: 0,
        reachable_ratio: 0.0,
    });
    warn!(
        "{}: no attempt reached ratio {accept_ratio:.2} in {max_attempts} tries, keeping last ({:.3})",
        kind.name(),
        map.reachable_ratio
    );
    Err(DegradedMap(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;
    use rand::SeedableRng;

    #[test]
    fn factory_builds_every_kind() {
        let config = MapConfig::default();
        for kind in GeneratorKind::ALL {
            assert_eq!(build_generator(&config, kind).kind(), kind);
        }
    }

    #[test]
    fn retry_returns_last_attempt_when_threshold_is_never_met() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut calls = 0;
        let result = retry_until_connected(
            GeneratorKind::WalkerMaze,
            3,
            0.99,
            (1, 1),
            Walkability::Breachable,
            &mut rng,
            |_| {
                calls += 1;
                // две несвязные клетки: доля 0.5
                let mut grid = TileGrid::new(5, 5);
                grid.set_kind(1, 1, TileKind::Empty);
                grid.set_kind(3, 3, TileKind::Empty);
                grid
            },
        );
        assert_eq!(calls, 3);
        let degraded = result.unwrap_err().into_inner();
        assert_eq!(degraded.attempts, 3);
        assert!((degraded.reachable_ratio - 0.5).abs() < f32::EPSILON);
        assert_eq!(degraded.grid.rows(), 5);
    }

    #[test]
    fn retry_accepts_first_good_attempt() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = retry_until_connected(
            GeneratorKind::BacktrackingMaze,
            0,
            0.98,
            (1, 1),
            Walkability::Breachable,
            &mut rng,
            |_| {
                let mut grid = TileGrid::new(4, 4);
                grid.set_kind(1, 1, TileKind::Empty);
                grid.set_kind(1, 2, TileKind::Empty);
                grid
            },
        );
        let map = result.unwrap();
        assert_eq!(map.attempts, 1);
        assert!((map.reachable_ratio - 1.0).abs() < f32::EPSILON);
    }
}
