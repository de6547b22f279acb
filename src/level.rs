// src/level.rs
//! Выбор генератора по номеру уровня и пакетный прогон по множеству сидов

use crate::config::{GeneratorKind, MapConfig};
use crate::generator::{Generation, build_generator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Генераторы чередуются по кругу, начиная с первого уровня
#[must_use]
pub fn generator_for_level(level: u32) -> GeneratorKind {
    let n = GeneratorKind::ALL.len();
    GeneratorKind::ALL[level.saturating_sub(1) as usize % n]
}

/// Сид уровня, производный от базового сида
#[must_use]
pub fn level_seed(seed: u64, level: u32) -> u64 {
    seed.wrapping_add(u64::from(level).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Генерирует карту уровня. Без сида в конфигурации берётся энтропия ОС.
#[must_use]
pub fn generate_level(config: &MapConfig, level: u32) -> Generation {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(level_seed(seed, level)),
        None => ChaCha8Rng::from_entropy(),
    };
    build_generator(config, generator_for_level(level)).generate(config.rows, config.cols, &mut rng)
}

/// Итог пакетного прогона
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    pub generator: GeneratorKind,
    pub runs: usize,
    pub min_ratio: f32,
    pub mean_ratio: f32,
    /// Сколько раз лабиринт не дотянул до порога
    pub degraded: usize,
    pub max_attempts: usize,
}

/// (доля достижимых, попытки, деградация)
fn run_seed(config: &MapConfig, seed: u64) -> (f32, usize, bool) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    match build_generator(config, config.generator).generate(config.rows, config.cols, &mut rng) {
        Ok(map) => (map.reachable_ratio, map.attempts, false),
        Err(degraded) => (degraded.0.reachable_ratio, degraded.0.attempts, true),
    }
}

/// Прогоняет генератор из конфигурации по всем сидам
#[must_use]
pub fn survey(config: &MapConfig, seeds: &[u64]) -> SurveyReport {
    #[cfg(feature = "parallel")]
    let results: Vec<(f32, usize, bool)> = seeds.par_iter().map(|&seed| run_seed(config, seed)).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<(f32, usize, bool)> = seeds.iter().map(|&seed| run_seed(config, seed)).collect();

    let runs = results.len();
    let min_ratio = results.iter().map(|r| r.0).fold(1.0_f32, f32::min);
    let mean_ratio = if runs == 0 {
        1.0
    } else {
        results.iter().map(|r| r.0).sum::<f32>() / runs as f32
    };

    SurveyReport {
        generator: config.generator,
        runs,
        min_ratio,
        mean_ratio,
        degraded: results.iter().filter(|r| r.2).count(),
        max_attempts: results.iter().map(|r| r.1).max().unwrap_or(0),
    }
}
