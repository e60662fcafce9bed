//! Built-in demo level set: an open primary map plus one sub-layout per
//! fixed room, shaped after the configured room blueprints.

use crate::assets::{EntityPlacement, InMemoryLayouts, LayoutFlags, LevelAsset};
use crate::config::{DoorOffsets, GenerationContext, MazeConfig, RoomBlueprint};
use crate::state::{FLOOR_LAYER, OBSTACLE_LAYER};
use crate::types::{EntityRole, Pos, TileId};

pub const DEMO_LEVEL_SET: &str = "demo";

pub fn demo_layouts(config: &MazeConfig) -> InMemoryLayouts {
    let naming = GenerationContext::new(DEMO_LEVEL_SET, 0);
    let wall = config.tiles.maze_wall;

    let mut spawn = room_asset(naming.sublayout_name(0), &config.rooms.spawn, wall);
    let center = (config.rooms.spawn.size / 2) as i32;
    spawn.entities.push(EntityPlacement {
        kind: config.kinds.exit_anchor,
        pos: Pos { y: center, x: center },
        role: EntityRole::Player,
    });

    let mut shop = room_asset(naming.sublayout_name(1), &config.rooms.shop, wall);
    shop.flags = LayoutFlags { disable_monsters: true, ..LayoutFlags::default() };
    // Counter tile, reset to plain floor once the room is composed.
    let counter = (config.rooms.shop.size / 2) as i32;
    shop.set_tile(FLOOR_LAYER, Pos { y: counter, x: counter }, config.tiles.placeholder);

    let mut secret = room_asset(naming.sublayout_name(2), &config.rooms.secret, wall);
    secret.flags =
        LayoutFlags { disable_traps: true, disable_loot: true, ..LayoutFlags::default() };

    InMemoryLayouts::new()
        .with(LevelAsset::blank(DEMO_LEVEL_SET, config.cols, config.rows, 2))
        .with(spawn)
        .with(shop)
        .with(secret)
}

/// A walled square of the blueprint's size, open where its doors are.
fn room_asset(name: String, blueprint: &RoomBlueprint, wall: TileId) -> LevelAsset {
    let size = blueprint.size;
    let mut asset = LevelAsset::blank(name, size, size, 2);
    let last = size as i32 - 1;
    for y in 0..=last {
        for x in 0..=last {
            if x == 0 || y == 0 || x == last || y == last {
                asset.set_tile(OBSTACLE_LAYER, Pos { y, x }, wall);
            }
        }
    }
    for pos in door_cells(blueprint.doors, last) {
        asset.set_tile(OBSTACLE_LAYER, pos, TileId::EMPTY);
    }
    asset
}

fn door_cells(doors: DoorOffsets, last: i32) -> Vec<Pos> {
    let sides = [
        doors.north.map(|offset| Pos { y: 0, x: offset as i32 }),
        doors.east.map(|offset| Pos { y: offset as i32, x: last }),
        doors.south.map(|offset| Pos { y: last, x: offset as i32 }),
        doors.west.map(|offset| Pos { y: offset as i32, x: 0 }),
    ];
    sides.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LayoutSource;
    use crate::types::Direction;

    #[test]
    fn demo_set_has_a_primary_and_three_rooms() {
        let config = MazeConfig::default();
        let layouts = demo_layouts(&config);
        assert_eq!(layouts.len(), 4);

        let primary = layouts.load(DEMO_LEVEL_SET).expect("primary");
        assert_eq!((primary.width, primary.height), (48, 48));
        let spawn = layouts.load("demo00").expect("spawn room");
        assert_eq!(spawn.entities.len(), 1);
        assert_eq!(spawn.entities[0].pos, Pos { y: 4, x: 4 });
        assert!(layouts.load("demo03").is_err());
    }

    #[test]
    fn room_doors_follow_the_blueprint_offsets() {
        let config = MazeConfig::default();
        let layouts = demo_layouts(&config);

        let spawn = layouts.load("demo00").expect("spawn room");
        let dirs: Vec<Direction> = spawn.edge_doors().iter().map(|door| door.dir).collect();
        let expected = [Direction::North, Direction::West, Direction::East, Direction::South];
        assert_eq!(dirs, expected.to_vec());

        let shop = layouts.load("demo01").expect("shop");
        let doors = shop.edge_doors();
        assert_eq!(doors.len(), 3);
        assert_eq!(doors[0].pos, Pos { y: 0, x: 2 });
        assert!(shop.flags.disable_monsters);
    }
}
