use crate::assets::LevelAsset;
use crate::state::{FLOOR_LAYER, OBSTACLE_LAYER, TileVolume};
use crate::terrain::PathOracle;
use crate::types::{Pos, TileId};

/// A `size x size` two-layer room with a wall ring, opened at `door` on
/// every side when given.
pub(crate) fn walled_room(name: &str, size: usize, door: Option<usize>) -> LevelAsset {
    let mut asset = LevelAsset::blank(name, size, size, 2);
    let last = size as i32 - 1;
    for y in 0..=last {
        for x in 0..=last {
            if x == 0 || y == 0 || x == last || y == last {
                asset.set_tile(OBSTACLE_LAYER, Pos { y, x }, TileId(10));
            }
        }
    }
    if let Some(offset) = door {
        let offset = offset as i32;
        for pos in [
            Pos { y: 0, x: offset },
            Pos { y: offset, x: last },
            Pos { y: last, x: offset },
            Pos { y: offset, x: 0 },
        ] {
            asset.set_tile(OBSTACLE_LAYER, pos, TileId::EMPTY);
        }
    }
    asset
}

/// Open two-layer map with walls on the given cells.
pub(crate) fn open_map(width: usize, height: usize, walls: &[Pos]) -> TileVolume {
    let mut map = TileVolume::new(width, height, 2);
    for &pos in walls {
        map.set_tile(OBSTACLE_LAYER, pos, TileId(10));
    }
    map
}

pub(crate) fn paint_floor(map: &mut TileVolume, cells: &[Pos], tile: TileId) {
    for &pos in cells {
        map.set_tile(FLOOR_LAYER, pos, tile);
    }
}

/// Path oracle that only accepts paths starting at listed cells.
pub(crate) struct ReachableFrom(pub(crate) Vec<Pos>);

impl PathOracle for ReachableFrom {
    fn path_exists(&self, _map: &TileVolume, from: Pos, _to: Pos) -> bool {
        self.0.contains(&from)
    }
}
