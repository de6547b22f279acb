// src/config.rs
//! Конфигурация генерации поля боя
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размер сетки и размер тайла в пикселях
//! - Выбор стратегии генерации (`GeneratorKind`)
//! - Параметры каждого семейства генераторов (BSP, лабиринты, поле сражения)
//! - Точку появления и размер безопасной зоны
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.
//! Некорректные значения не отвергаются при загрузке: генераторы сами ограничивают их
//! допустимыми пределами и в худшем случае просто не делят узел и не ставят объект.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Стратегия генерации карты
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
pub enum GeneratorKind {
    /// BSP: комнаты в листьях, L-образные коридоры между ними
    #[default]
    RoomsAndCorridors,
    /// BSP: только коридоры между центрами листьев и несколько петель
    CorridorsOnly,
    /// BSP: аккуратные комнаты с отступом и коридоры без кирпича
    StrictBsp,
    /// Лабиринт поиском в глубину с возвратом
    BacktrackingMaze,
    /// Несколько независимых «пьяных» копателей
    WalkerMaze,
    /// Открытое поле с рекой, хребтами, руинами и лесом
    Battlefield,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 6] = [
        GeneratorKind::RoomsAndCorridors,
        GeneratorKind::CorridorsOnly,
        GeneratorKind::StrictBsp,
        GeneratorKind::BacktrackingMaze,
        GeneratorKind::WalkerMaze,
        GeneratorKind::Battlefield,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::RoomsAndCorridors => "rooms-and-corridors",
            GeneratorKind::CorridorsOnly => "corridors-only",
            GeneratorKind::StrictBsp => "strict-bsp",
            GeneratorKind::BacktrackingMaze => "backtracking-maze",
            GeneratorKind::WalkerMaze => "walker-maze",
            GeneratorKind::Battlefield => "battlefield",
        }
    }
}

/// Параметры семейства BSP-генераторов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BspSettings {
    /// Минимальная ширина и высота листа
    #[serde(default = "default_min_leaf_size")]
    pub min_leaf_size: usize,

    /// Соотношение сторон, начиная с которого ось разреза выбирается принудительно
    #[serde(default = "default_split_bias")]
    pub split_bias: f32,

    /// Ширина коридора в клетках
    #[serde(default = "default_corridor_width")]
    pub corridor_width: usize,

    /// Отступ комнаты от границы листа
    #[serde(default = "default_room_padding")]
    pub room_padding: usize,

    /// Максимальное случайное уменьшение комнаты по каждой оси
    #[serde(default = "default_room_shrink")]
    pub room_shrink: usize,

    /// Вероятность кирпича внутри комнаты
    #[serde(default = "default_decor_brick_chance")]
    pub decor_brick_chance: f64,

    /// Вероятность камня внутри комнаты (проверяется после кирпича)
    #[serde(default = "default_decor_stone_chance")]
    pub decor_stone_chance: f64,

    /// Доля камня, которую коридор оставляет кирпичом
    #[serde(default = "default_corridor_brick_chance")]
    pub corridor_brick_chance: f64,

    /// Вероятность кирпича в комнатах строгого BSP
    #[serde(default = "default_strict_brick_chance")]
    pub strict_brick_chance: f64,

    /// Число случайных проёмов 2×2 в генераторе «только коридоры»
    #[serde(default = "default_loop_openings")]
    pub loop_openings: usize,
}

fn default_min_leaf_size() -> usize {
    8
}
fn default_split_bias() -> f32 {
    1.25
}
fn default_corridor_width() -> usize {
    2
}
fn default_room_padding() -> usize {
    1
}
fn default_room_shrink() -> usize {
    2
}
fn default_decor_brick_chance() -> f64 {
    0.12
}
fn default_decor_stone_chance() -> f64 {
    0.02
}
fn default_corridor_brick_chance() -> f64 {
    0.25
}
fn default_strict_brick_chance() -> f64 {
    0.05
}
fn default_loop_openings() -> usize {
    4
}

impl Default for BspSettings {
    fn default() -> Self {
        Self {
            min_leaf_size: 8,
            split_bias: 1.25,
            corridor_width: 2,
            room_padding: 1,
            room_shrink: 2,
            decor_brick_chance: 0.12,
            decor_stone_chance: 0.02,
            corridor_brick_chance: 0.25,
            strict_brick_chance: 0.05,
            loop_openings: 4,
        }
    }
}

/// Параметры лабиринта с возвратом
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MazeSettings {
    /// Размер логической клетки в тайлах (1 или 2)
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Вероятность пробить стену в уже посещённую клетку (петля)
    #[serde(default = "default_loop_chance")]
    pub loop_chance: f64,

    /// Вероятность перекладины в прямом коридоре
    #[serde(default = "default_bar_chance")]
    pub bar_chance: f64,

    /// Вероятность блока на развилке
    #[serde(default = "default_blocker_chance")]
    pub blocker_chance: f64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Минимальная доля достижимых клеток для принятия попытки
    #[serde(default = "default_accept_ratio")]
    pub accept_ratio: f32,
}

fn default_block_size() -> usize {
    2
}
fn default_loop_chance() -> f64 {
    0.08
}
fn default_bar_chance() -> f64 {
    0.15
}
fn default_blocker_chance() -> f64 {
    0.25
}
fn default_max_attempts() -> usize {
    50
}
fn default_accept_ratio() -> f32 {
    0.98
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            block_size: 2,
            loop_chance: 0.08,
            bar_chance: 0.15,
            blocker_chance: 0.25,
            max_attempts: 50,
            accept_ratio: 0.98,
        }
    }
}

/// Параметры лабиринта из нескольких копателей
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkerSettings {
    #[serde(default = "default_walkers")]
    pub walkers: usize,

    /// Шагов на одного копателя
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Размер кисти: 1 или 2 тайла
    #[serde(default = "default_brush")]
    pub brush: usize,

    /// Вероятность оставить кирпич вместо пустоты
    #[serde(default = "default_walker_brick_chance")]
    pub brick_chance: f64,

    #[serde(default = "default_water_chance")]
    pub water_chance: f64,

    #[serde(default = "default_grass_chance")]
    pub grass_chance: f64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default = "default_accept_ratio")]
    pub accept_ratio: f32,
}

fn default_walkers() -> usize {
    4
}
fn default_steps() -> usize {
    300
}
fn default_brush() -> usize {
    2
}
fn default_walker_brick_chance() -> f64 {
    0.04
}
fn default_water_chance() -> f64 {
    0.01
}
fn default_grass_chance() -> f64 {
    0.06
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            walkers: 4,
            steps: 300,
            brush: 2,
            brick_chance: 0.04,
            water_chance: 0.01,
            grass_chance: 0.06,
            max_attempts: 50,
            accept_ratio: 0.98,
        }
    }
}

/// Направление реки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RiverAxis {
    /// Выбирается случайно при каждой генерации
    #[default]
    Random,
    /// Слева направо через всю ширину
    Horizontal,
    /// Сверху вниз через всю высоту
    Vertical,
    /// Без реки
    None,
}

/// Параметры открытого поля сражения
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BattlefieldSettings {
    #[serde(default)]
    pub river_axis: RiverAxis,

    #[serde(default = "default_river_width")]
    pub river_width: usize,

    /// Мост через каждые N клеток вдоль русла
    #[serde(default = "default_bridge_interval")]
    pub bridge_interval: usize,

    /// Амплитуда синусоиды русла в клетках
    #[serde(default = "default_river_amplitude")]
    pub river_amplitude: f32,

    /// Частота синусоиды (радиан на клетку)
    #[serde(default = "default_river_frequency")]
    pub river_frequency: f32,

    #[serde(default = "default_ridges")]
    pub ridges: usize,

    #[serde(default = "default_ridge_length")]
    pub ridge_length: usize,

    #[serde(default = "default_ruins")]
    pub ruins: usize,

    /// Заполненность руин кирпичом
    #[serde(default = "default_ruin_fill")]
    pub ruin_fill: f64,

    #[serde(default = "default_bunkers")]
    pub bunkers: usize,

    #[serde(default = "default_debris")]
    pub debris: usize,

    /// Сколько из 8 соседей должны быть пустыми, чтобы положить обломок
    #[serde(default = "default_debris_min_empty")]
    pub debris_min_empty: usize,

    #[serde(default = "default_forests")]
    pub forests: usize,

    #[serde(default = "default_forest_radius")]
    pub forest_radius: usize,
}

fn default_river_width() -> usize {
    3
}
fn default_bridge_interval() -> usize {
    15
}
fn default_river_amplitude() -> f32 {
    2.0
}
fn default_river_frequency() -> f32 {
    0.3
}
fn default_ridges() -> usize {
    4
}
fn default_ridge_length() -> usize {
    10
}
fn default_ruins() -> usize {
    3
}
fn default_ruin_fill() -> f64 {
    0.6
}
fn default_bunkers() -> usize {
    4
}
fn default_debris() -> usize {
    14
}
fn default_debris_min_empty() -> usize {
    7
}
fn default_forests() -> usize {
    3
}
fn default_forest_radius() -> usize {
    2
}

impl Default for BattlefieldSettings {
    fn default() -> Self {
        Self {
            river_axis: RiverAxis::Random,
            river_width: 3,
            bridge_interval: 15,
            river_amplitude: 2.0,
            river_frequency: 0.3,
            ridges: 4,
            ridge_length: 10,
            ruins: 3,
            ruin_fill: 0.6,
            bunkers: 4,
            debris: 14,
            debris_min_empty: 7,
            forests: 3,
            forest_radius: 2,
        }
    }
}

/// Точка появления и безопасная зона вокруг неё
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpawnSettings {
    /// Клетка появления игрока `(row, col)`
    #[serde(default = "default_spawn")]
    pub cell: (usize, usize),

    /// Сторона квадратной безопасной зоны у каждого угла
    #[serde(default = "default_zone")]
    pub zone: usize,
}

fn default_spawn() -> (usize, usize) {
    (1, 1)
}
fn default_zone() -> usize {
    3
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            cell: (1, 1),
            zone: 3,
        }
    }
}

/// Основные параметры генерации
///
/// Полная конфигурация одной карты. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Сид генератора случайных чисел. Без сида берётся энтропия ОС.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Число строк сетки (по умолчанию 22)
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Число столбцов сетки (по умолчанию 30)
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Размер тайла в пикселях: нужен только симуляции и превью
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    #[serde(default)]
    pub generator: GeneratorKind,

    #[serde(default)]
    pub bsp: BspSettings,

    #[serde(default)]
    pub maze: MazeSettings,

    #[serde(default)]
    pub walkers: WalkerSettings,

    #[serde(default)]
    pub battlefield: BattlefieldSettings,

    #[serde(default)]
    pub spawn: SpawnSettings,
}

impl MapConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # level.toml
    /// seed = 42
    /// generator = "Battlefield"
    ///
    /// [battlefield]
    /// river_axis = "Horizontal"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Разбирает параметры из строки TOML
    ///
    /// ```
    /// use tankfield::{GeneratorKind, MapConfig};
    /// let config = MapConfig::from_toml_str("seed = 7\ngenerator = \"StrictBsp\"").unwrap();
    /// assert_eq!(config.seed, Some(7));
    /// assert_eq!(config.generator, GeneratorKind::StrictBsp);
    /// assert_eq!((config.rows, config.cols), (22, 30));
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Генератор случайных чисел: детерминированный при заданном сиде
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

fn default_rows() -> usize {
    22
}
fn default_cols() -> usize {
    30
}
fn default_tile_size() -> u32 {
    32
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: None,
            rows: 22,
            cols: 30,
            tile_size: 32,
            generator: GeneratorKind::default(),
            bsp: BspSettings::default(),
            maze: MazeSettings::default(),
            walkers: WalkerSettings::default(),
            battlefield: BattlefieldSettings::default(),
            spawn: SpawnSettings::default(),
        }
    }
}
