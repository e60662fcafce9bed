pub mod assets;
pub mod config;
pub mod demo;
pub mod error;
pub mod mapgen;
pub mod state;
pub mod terrain;
pub mod types;

#[cfg(test)]
mod test_support;

pub use assets::{InMemoryLayouts, LayoutSource, LevelAsset};
pub use config::{GenerationContext, MazeConfig};
pub use error::{ConfigError, GenerationError, LayoutError};
pub use mapgen::{GeneratedLevel, MazeGenerator, generate_level};
pub use state::{Entity, EntityStore, TileVolume};
pub use terrain::{GridPathfinder, PathOracle, TerrainRules, TileTerrain};
pub use types::*;
