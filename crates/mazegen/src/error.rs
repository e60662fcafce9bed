//! Error taxonomy for level generation and its collaborators.

use thiserror::Error;

use crate::types::Pos;

/// Fatal generation failures. A failed call never hands out a partial level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no level of set '{level_set}' could be found")]
    PrimaryLayoutMissing { level_set: String },

    #[error("level set '{level_set}' has {found} loadable sub-layouts, {required} are required")]
    NotEnoughSubLayouts { level_set: String, found: usize, required: usize },

    #[error("no free {height}x{width} location with padding {padding} in the pre-level grid")]
    NoRoomCandidates { height: usize, width: usize, padding: usize },

    #[error("sub-layout '{name}' anchored at {anchor:?} does not fit in the {width}x{height} map")]
    SubLayoutOutOfBounds { name: String, anchor: Pos, width: usize, height: usize },

    #[error("ran out of eligible cells with {remaining} placements left")]
    PlacementExhausted { remaining: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Failures reported by a [`crate::assets::LayoutSource`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout '{0}' does not exist")]
    NotFound(String),

    #[error("layout '{name}' could not be read: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid of {rows}x{cols} is too small, both sides must be at least {minimum}")]
    GridTooSmall { rows: usize, cols: usize, minimum: usize },

    #[error("maze origin ({row}, {col}) must be odd and inside the grid border")]
    BadMazeOrigin { row: usize, col: usize },

    #[error("room blueprint '{room}': {reason}")]
    BadRoom { room: &'static str, reason: String },

    #[error("gold odds must be at least 1")]
    ZeroGoldOdds,
}
