pub mod config;
pub mod connectivity;
pub mod generator;
pub mod grid;
pub mod level;
pub mod partition;
pub mod png;
pub mod query;
pub mod tile;

pub use config::{ConfigError, GeneratorKind, MapConfig};
pub use connectivity::{ConnectivityReport, Walkability, check};
pub use generator::{
    DegradedMap, GeneratedMap, Generation, MapGenerator, build_generator, generate,
};
pub use grid::{Cell, Rect, TileGrid};
pub use level::{SurveyReport, generate_level, generator_for_level, survey};
pub use query::PixelView;
pub use tile::{Tile, TileKind};
