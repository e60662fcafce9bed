//! Generation configuration and the explicit per-call context.
//!
//! [`MazeConfig`] describes a deployment (grid size, room geometry, tile
//! and entity ids, spawn policy). Its `Default` is the reference 48x48
//! maze level. [`GenerationContext`] carries everything that changes
//! from one call to the next.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{EntityKind, TileId};

const MIN_GRID_SIDE: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub rows: usize,
    pub cols: usize,
    pub maze_origin: (usize, usize),
    pub loop_attempts: usize,
    pub rooms: RoomSet,
    pub spawns: SpawnPolicy,
    pub sublayouts: SubLayoutPolicy,
    pub tiles: TileRules,
    pub kinds: EntityKinds,
    pub exits: ExitRules,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: 48,
            cols: 48,
            maze_origin: (1, 1),
            loop_attempts: 150,
            rooms: RoomSet::default(),
            spawns: SpawnPolicy::default(),
            sublayouts: SubLayoutPolicy::default(),
            tiles: TileRules::default(),
            kinds: EntityKinds::default(),
            exits: ExitRules::default(),
        }
    }
}

impl MazeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_GRID_SIDE || self.cols < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
                minimum: MIN_GRID_SIDE,
            });
        }

        let (row, col) = self.maze_origin;
        if row % 2 == 0 || col % 2 == 0 || row + 1 >= self.rows || col + 1 >= self.cols {
            return Err(ConfigError::BadMazeOrigin { row, col });
        }

        for (name, room) in self.rooms.named() {
            room.validate(name, self.rows, self.cols)?;
        }

        if self.spawns.gold_odds == 0 {
            return Err(ConfigError::ZeroGoldOdds);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSet {
    pub spawn: RoomBlueprint,
    pub shop: RoomBlueprint,
    pub secret: RoomBlueprint,
}

impl RoomSet {
    /// Rooms in anchor order: spawn, shop, secret.
    pub fn named(&self) -> [(&'static str, &RoomBlueprint); 3] {
        [("spawn", &self.spawn), ("shop", &self.shop), ("secret", &self.secret)]
    }
}

impl Default for RoomSet {
    fn default() -> Self {
        Self {
            spawn: RoomBlueprint {
                size: 9,
                footprint: 9,
                inset: 0,
                padding: 16,
                doors: DoorOffsets::all(5),
                open_threshold_before_carve: false,
                vestibule: None,
            },
            shop: RoomBlueprint {
                size: 7,
                footprint: 11,
                inset: 1,
                padding: 0,
                doors: DoorOffsets { north: Some(2), east: Some(2), south: Some(4), west: None },
                open_threshold_before_carve: true,
                vestibule: Some(Vestibule {
                    inset: 1,
                    doors: DoorOffsets { north: None, east: None, south: Some(2), west: None },
                }),
            },
            secret: RoomBlueprint {
                size: 9,
                footprint: 13,
                inset: 2,
                padding: 0,
                doors: DoorOffsets::all(3),
                open_threshold_before_carve: false,
                vestibule: None,
            },
        }
    }
}

/// Geometry of one fixed room carved before the maze.
///
/// The placement search looks for a free `footprint`-sided square, the room
/// itself is a `size`-sided square starting `inset` cells inside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBlueprint {
    pub size: usize,
    pub footprint: usize,
    pub inset: usize,
    pub padding: usize,
    pub doors: DoorOffsets,
    /// Threshold cells are stamped as floor instead of carve-eligible wall
    /// while the maze is carved.
    pub open_threshold_before_carve: bool,
    /// Re-stamp the room as an open floor ring around a smaller walled room.
    pub vestibule: Option<Vestibule>,
}

impl RoomBlueprint {
    fn validate(&self, room: &'static str, rows: usize, cols: usize) -> Result<(), ConfigError> {
        let bad = |reason: String| ConfigError::BadRoom { room, reason };
        if self.size < 3 || self.size % 2 == 0 {
            return Err(bad(format!("size {} must be odd and at least 3", self.size)));
        }
        if self.inset + self.size > self.footprint {
            return Err(bad(format!(
                "room of size {} at inset {} overflows footprint {}",
                self.size, self.inset, self.footprint
            )));
        }
        if self.footprint + 2 * self.padding > rows.min(cols) {
            return Err(bad(format!(
                "footprint {} with padding {} does not fit a {rows}x{cols} grid",
                self.footprint, self.padding
            )));
        }
        if self.doors.iter().any(|offset| offset == 0 || offset + 1 >= self.size) {
            return Err(bad("door offsets must land strictly inside a wall".to_string()));
        }
        if let Some(vestibule) = &self.vestibule {
            let inner = self.size.saturating_sub(2 * vestibule.inset);
            if inner < 3 {
                return Err(bad(format!("vestibule inset {} leaves no room", vestibule.inset)));
            }
            if vestibule.doors.iter().any(|offset| offset == 0 || offset + 1 >= inner) {
                return Err(bad("vestibule door offsets must land inside a wall".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vestibule {
    pub inset: usize,
    pub doors: DoorOffsets,
}

/// Door offsets along each wall, measured from the room's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorOffsets {
    pub north: Option<usize>,
    pub east: Option<usize>,
    pub south: Option<usize>,
    pub west: Option<usize>,
}

impl DoorOffsets {
    pub const NONE: DoorOffsets = DoorOffsets { north: None, east: None, south: None, west: None };

    pub fn all(offset: usize) -> Self {
        Self { north: Some(offset), east: Some(offset), south: Some(offset), west: Some(offset) }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        [self.north, self.east, self.south, self.west].into_iter().flatten()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    pub forced_monsters: usize,
    pub forced_loot: usize,
    /// One loot placement in `gold_odds` is gold, the rest are items.
    pub gold_odds: u32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self { forced_monsters: 33, forced_loot: 0, gold_odds: 10 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubLayoutPolicy {
    pub scan_limit: usize,
    pub required: usize,
}

impl Default for SubLayoutPolicy {
    fn default() -> Self {
        Self { scan_limit: 100, required: 3 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRules {
    pub maze_wall: TileId,
    pub placeholder: TileId,
    pub lava: BTreeSet<TileId>,
    pub swimmable: BTreeSet<TileId>,
}

impl Default for TileRules {
    fn default() -> Self {
        Self {
            maze_wall: TileId(10),
            placeholder: TileId(201),
            lava: BTreeSet::new(),
            swimmable: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityKinds {
    pub ladder: EntityKind,
    pub portal: EntityKind,
    pub monster: EntityKind,
    pub item: EntityKind,
    pub gold: EntityKind,
    /// Entity the level exit must be reachable from.
    pub exit_anchor: EntityKind,
}

impl Default for EntityKinds {
    fn default() -> Self {
        Self {
            ladder: EntityKind(11),
            portal: EntityKind(45),
            monster: EntityKind(10),
            item: EntityKind(8),
            gold: EntityKind(9),
            exit_anchor: EntityKind(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitRules {
    pub portal_map_prefixes: Vec<String>,
    pub unchecked_map_prefixes: Vec<String>,
}

impl Default for ExitRules {
    fn default() -> Self {
        Self {
            portal_map_prefixes: vec!["Hell".to_string()],
            unchecked_map_prefixes: vec!["Underworld".to_string()],
        }
    }
}

impl ExitRules {
    pub fn uses_portal(&self, map_name: &str) -> bool {
        self.portal_map_prefixes.iter().any(|prefix| map_name.starts_with(prefix.as_str()))
    }

    pub fn checks_path(&self, map_name: &str) -> bool {
        !self.unchecked_map_prefixes.iter().any(|prefix| map_name.starts_with(prefix.as_str()))
    }
}

/// Per-call generation state. Nothing here outlives a single `generate` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub seed: u32,
    pub level_index: u32,
    pub level_set: String,
    /// Reserve the second placement for an additional level exit.
    #[serde(default)]
    pub secondary_exit: bool,
    #[serde(default)]
    pub disable_normal_exit: bool,
    /// Keep population out of the tertiary room as well as the spawn room.
    #[serde(default)]
    pub guard_tertiary_room: bool,
    /// Secret-exit designator handed back to the level-progression system.
    #[serde(default)]
    pub secret_exit: u8,
}

impl GenerationContext {
    pub fn new(level_set: impl Into<String>, seed: u32) -> Self {
        Self {
            seed,
            level_index: 0,
            level_set: level_set.into(),
            secondary_exit: false,
            disable_normal_exit: false,
            guard_tertiary_room: false,
            secret_exit: 0,
        }
    }

    pub fn sublayout_name(&self, index: usize) -> String {
        format!("{}{index:02}", self.level_set)
    }
}
