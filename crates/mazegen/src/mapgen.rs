//! Maze level generation split into the pre-level, composition and population stages.

pub mod grid;
pub mod layout;
pub mod maze;
pub mod model;
pub mod progression;
pub mod seed;

mod generator;
mod spawns;
mod vaults;

pub use generator::MazeGenerator;
pub use grid::{PreLevel, PreTile};
pub use layout::{PlacedRoom, RoomLayout, RoomRect, RoomTiles};
pub use maze::CarveSummary;
pub use model::{ExclusionMasks, GeneratedLevel, GenerationStats, RoomAnchors};
pub use progression::{PlacementKind, SpawnBudget};
pub use seed::{MapRng, RandomSource};

use crate::assets::LayoutSource;
use crate::config::{GenerationContext, MazeConfig};
use crate::error::GenerationError;
use crate::terrain::{GridPathfinder, TileTerrain};

/// Generates with tile-table terrain rules and the built-in flood-fill pathfinder.
pub fn generate_level(
    config: &MazeConfig,
    layouts: &dyn LayoutSource,
    context: &GenerationContext,
) -> Result<GeneratedLevel, GenerationError> {
    let terrain = TileTerrain::from_rules(&config.tiles);
    MazeGenerator::new(config, layouts, &terrain, &GridPathfinder).generate(context)
}
