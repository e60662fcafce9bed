//! Pre-level pipeline: reserve the fixed rooms, carve the maze, finish the
//! rooms, then project the result onto the obstacle layer of the map.

use crate::config::MazeConfig;
use crate::error::GenerationError;
use crate::state::{OBSTACLE_LAYER, TileVolume};
use crate::types::{Pos, TileId};

use super::super::grid::PreLevel;
use super::super::layout::{RoomLayout, finish_rooms, reserve_rooms};
use super::super::maze::{CarveSummary, carve_maze, inject_loops};
use super::super::model::RoomAnchors;
use super::super::seed::RandomSource;

pub(super) struct PreLevelPlan {
    pub(super) level: PreLevel,
    pub(super) rooms: RoomLayout,
    pub(super) carve: CarveSummary,
    pub(super) loops_opened: usize,
}

impl PreLevelPlan {
    pub(super) fn anchors(&self) -> RoomAnchors {
        RoomAnchors {
            spawn: self.rooms.spawn.rect.anchor(),
            shop: self.rooms.shop.rect.anchor(),
            secret: self.rooms.secret.rect.anchor(),
        }
    }
}

pub(super) fn build_prelevel(
    config: &MazeConfig,
    rng: &mut impl RandomSource,
) -> Result<PreLevelPlan, GenerationError> {
    let mut level = PreLevel::new(config.rows, config.cols);
    let reserved = reserve_rooms(&mut level, &config.rooms, rng)?;
    let carve = carve_maze(&mut level, config.maze_origin, rng);
    let loops_opened = inject_loops(&mut level, config.loop_attempts, rng);
    let rooms = finish_rooms(&mut level, &config.rooms, reserved);
    Ok(PreLevelPlan { level, rooms, carve, loops_opened })
}

/// Writes the pre-level onto the obstacle layer over the overlapping area.
/// Passable cells become empty, walls become `wall`.
pub(super) fn project_onto_map(level: &PreLevel, map: &mut TileVolume, wall: TileId) {
    let rows = level.rows().min(map.height());
    let cols = level.cols().min(map.width());
    for row in 0..rows {
        for col in 0..cols {
            let tile = if level[(row, col)].is_passable() { TileId::EMPTY } else { wall };
            map.set_tile(OBSTACLE_LAYER, Pos { y: row as i32, x: col as i32 }, tile);
        }
    }
}
