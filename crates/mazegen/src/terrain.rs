//! Terrain queries and reachability used by the population planner.
//! Hosts with their own collision or pathing rules plug in through these traits.
//! Nothing here mutates the map.

use std::collections::{BTreeSet, VecDeque};

use crate::config::TileRules;
use crate::state::{FLOOR_LAYER, OBSTACLE_LAYER, TileVolume};
use crate::types::{Pos, TileId};

pub trait TerrainRules {
    /// Structural obstacle at `pos`. Cells outside the map are obstacles.
    fn is_obstacle(&self, map: &TileVolume, pos: Pos) -> bool;
    fn is_lava(&self, tile: TileId) -> bool;
    fn is_swimmable(&self, tile: TileId) -> bool;

    /// Lava or deep liquid on the floor layer.
    fn is_hazard(&self, map: &TileVolume, pos: Pos) -> bool {
        let floor = map.tile_at(FLOOR_LAYER, pos);
        self.is_lava(floor) || self.is_swimmable(floor)
    }
}

pub trait PathOracle {
    fn path_exists(&self, map: &TileVolume, from: Pos, to: Pos) -> bool;
}

/// Obstacle-layer collision with lookup tables for hazardous floor tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileTerrain {
    lava: BTreeSet<TileId>,
    swimmable: BTreeSet<TileId>,
}

impl TileTerrain {
    pub fn from_rules(rules: &TileRules) -> Self {
        Self { lava: rules.lava.clone(), swimmable: rules.swimmable.clone() }
    }
}

impl TerrainRules for TileTerrain {
    fn is_obstacle(&self, map: &TileVolume, pos: Pos) -> bool {
        !map.in_bounds(pos) || !map.tile_at(OBSTACLE_LAYER, pos).is_empty()
    }

    fn is_lava(&self, tile: TileId) -> bool {
        self.lava.contains(&tile)
    }

    fn is_swimmable(&self, tile: TileId) -> bool {
        self.swimmable.contains(&tile)
    }
}

/// Four-way flood fill over cells with an empty obstacle layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridPathfinder;

impl PathOracle for GridPathfinder {
    fn path_exists(&self, map: &TileVolume, from: Pos, to: Pos) -> bool {
        if !map.in_bounds(from) || !map.in_bounds(to) {
            return false;
        }
        if from == to {
            return true;
        }
        let open_cell =
            |pos: Pos| map.in_bounds(pos) && map.tile_at(OBSTACLE_LAYER, pos).is_empty();

        let mut queue = VecDeque::from([from]);
        let mut visited = BTreeSet::from([from]);
        while let Some(current) = queue.pop_front() {
            for next in neighbors(current) {
                if next == to {
                    return true;
                }
                if open_cell(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}
