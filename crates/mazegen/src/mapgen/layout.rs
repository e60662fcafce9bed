//! Fixed-room placement search and room/door stamping on the pre-level grid.

use tracing::debug;

use crate::config::{DoorOffsets, RoomBlueprint, RoomSet};
use crate::error::GenerationError;
use crate::types::{Direction, Door, Pos};

use super::grid::{PreLevel, PreTile};
use super::seed::{RandomSource, pick_index};

/// Axis-aligned rectangle with exclusive end bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoomRect {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
}

impl RoomRect {
    pub fn square(row: usize, col: usize, size: usize) -> Self {
        Self { row, col, height: size, width: size }
    }

    pub fn row_end(self) -> usize {
        self.row + self.height
    }

    pub fn col_end(self) -> usize {
        self.col + self.width
    }

    pub fn anchor(self) -> Pos {
        Pos { y: self.row as i32, x: self.col as i32 }
    }

    pub fn intersects(self, other: RoomRect) -> bool {
        self.row < other.row_end()
            && other.row < self.row_end()
            && self.col < other.col_end()
            && other.col < self.col_end()
    }

    pub(super) fn shrunk(self, inset: usize) -> Self {
        Self {
            row: self.row + inset,
            col: self.col + inset,
            height: self.height - 2 * inset,
            width: self.width - 2 * inset,
        }
    }
}

/// A stamped room and the doors of its final stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedRoom {
    pub rect: RoomRect,
    pub doors: Vec<Door>,
}

/// The three fixed rooms, in composition order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    pub spawn: PlacedRoom,
    pub shop: PlacedRoom,
    pub secret: PlacedRoom,
}

impl RoomLayout {
    pub fn rooms(&self) -> [&PlacedRoom; 3] {
        [&self.spawn, &self.shop, &self.secret]
    }
}

/// Picks a uniformly random top-left cell for a `height x width` rectangle.
///
/// Candidates sit on even rows and columns, keep `padding` cells from every
/// grid edge, and cover only carve-eligible `Wall` cells.
pub fn find_room_anchor(
    level: &PreLevel,
    height: usize,
    width: usize,
    padding: usize,
    rng: &mut impl RandomSource,
) -> Result<(usize, usize), GenerationError> {
    let mut candidates = Vec::new();
    for row in (0..level.rows()).step_by(2) {
        for col in (0..level.cols()).step_by(2) {
            if row < padding
                || col < padding
                || row + height + padding > level.rows()
                || col + width + padding > level.cols()
            {
                continue;
            }
            let all_wall = (row..row + height)
                .all(|r| (col..col + width).all(|c| level.is(r, c, PreTile::Wall)));
            if all_wall {
                candidates.push((row, col));
            }
        }
    }

    if candidates.is_empty() {
        return Err(GenerationError::NoRoomCandidates { height, width, padding });
    }
    Ok(candidates[pick_index(rng, candidates.len())])
}

pub fn stamp_room(level: &mut PreLevel, rect: RoomRect, wall: PreTile, fill: PreTile) {
    level.fill(rect.row..rect.row_end(), rect.col..rect.col + 1, wall);
    level.fill(rect.row..rect.row_end(), rect.col_end() - 1..rect.col_end(), wall);
    level.fill(rect.row..rect.row + 1, rect.col..rect.col_end(), wall);
    level.fill(rect.row_end() - 1..rect.row_end(), rect.col..rect.col_end(), wall);
    level.fill(rect.row + 1..rect.row_end() - 1, rect.col + 1..rect.col_end() - 1, fill);
}

/// Stamps a room and opens a door on every side with an offset.
///
/// Each door overwrites one wall cell with `door` and the cell just outside
/// it with `entrance`. The entrance cell must exist on the grid.
pub fn stamp_room_with_doors(
    level: &mut PreLevel,
    rect: RoomRect,
    tiles: RoomTiles,
    offsets: DoorOffsets,
) -> Vec<Door> {
    stamp_room(level, rect, tiles.wall, tiles.fill);

    let sides = [
        (Direction::North, offsets.north),
        (Direction::East, offsets.east),
        (Direction::South, offsets.south),
        (Direction::West, offsets.west),
    ];
    let mut doors = Vec::new();
    for (dir, offset) in sides {
        let Some(offset) = offset else {
            continue;
        };
        let (row, col) = match dir {
            Direction::North => (rect.row, rect.col + offset),
            Direction::East => (rect.row + offset, rect.col_end() - 1),
            Direction::South => (rect.row_end() - 1, rect.col + offset),
            Direction::West => (rect.row + offset, rect.col),
        };
        let door = Door { pos: Pos { y: row as i32, x: col as i32 }, dir };
        let threshold = door.threshold();
        level.set(row, col, tiles.door);
        level.set(threshold.y as usize, threshold.x as usize, tiles.entrance);
        doors.push(door);
    }
    doors
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomTiles {
    pub wall: PreTile,
    pub fill: PreTile,
    pub door: PreTile,
    pub entrance: PreTile,
}

impl RoomTiles {
    /// Carve-exempt room shell stamped before the maze exists.
    fn reserved(open_threshold: bool) -> Self {
        Self {
            wall: PreTile::HardFloor,
            fill: PreTile::HardFloor,
            door: PreTile::Floor,
            entrance: if open_threshold { PreTile::Floor } else { PreTile::Wall },
        }
    }

    const FINAL: RoomTiles = RoomTiles {
        wall: PreTile::Wall,
        fill: PreTile::Floor,
        door: PreTile::Floor,
        entrance: PreTile::Floor,
    };
}

/// Places and reserves the spawn, shop and secret rooms, in that order.
pub(super) fn reserve_rooms(
    level: &mut PreLevel,
    rooms: &RoomSet,
    rng: &mut impl RandomSource,
) -> Result<[RoomRect; 3], GenerationError> {
    let mut placed = Vec::with_capacity(3);
    for (name, blueprint) in rooms.named() {
        let rect = reserve_room(level, blueprint, rng)?;
        debug!(room = name, row = rect.row, col = rect.col, size = rect.height, "reserved room");
        placed.push(rect);
    }
    Ok([placed[0], placed[1], placed[2]])
}

fn reserve_room(
    level: &mut PreLevel,
    blueprint: &RoomBlueprint,
    rng: &mut impl RandomSource,
) -> Result<RoomRect, GenerationError> {
    let (row, col) = find_room_anchor(
        level,
        blueprint.footprint,
        blueprint.footprint,
        blueprint.padding,
        rng,
    )?;
    let rect = RoomRect::square(row + blueprint.inset, col + blueprint.inset, blueprint.size);
    stamp_room_with_doors(
        level,
        rect,
        RoomTiles::reserved(blueprint.open_threshold_before_carve),
        blueprint.doors,
    );
    Ok(rect)
}

/// Re-stamps reserved rooms with their final, carve-compatible tiles.
pub(super) fn finish_rooms(
    level: &mut PreLevel,
    rooms: &RoomSet,
    rects: [RoomRect; 3],
) -> RoomLayout {
    let [spawn, shop, secret] = rects;
    RoomLayout {
        spawn: finish_room(level, &rooms.spawn, spawn),
        shop: finish_room(level, &rooms.shop, shop),
        secret: finish_room(level, &rooms.secret, secret),
    }
}

fn finish_room(level: &mut PreLevel, blueprint: &RoomBlueprint, rect: RoomRect) -> PlacedRoom {
    let doors = match &blueprint.vestibule {
        Some(vestibule) => {
            stamp_room(level, rect, PreTile::Floor, PreTile::Floor);
            stamp_room_with_doors(
                level,
                rect.shrunk(vestibule.inset),
                RoomTiles::FINAL,
                vestibule.doors,
            )
        }
        None => stamp_room_with_doors(level, rect, RoomTiles::FINAL, blueprint.doors),
    };
    PlacedRoom { rect, doors }
}
