//! Fixed sub-layout loading and composition onto the final map.

use tracing::{debug, warn};

use crate::assets::{LayoutSource, LevelAsset};
use crate::config::{GenerationContext, SubLayoutPolicy};
use crate::error::{GenerationError, LayoutError};
use crate::state::{Entity, EntityStore, TileVolume};
use crate::types::{Door, Pos, TileId};

use super::model::{ExclusionMasks, RoomAnchors};

/// Loads `<level_set>00`, `<level_set>01`, ... until a name is missing.
/// Unreadable assets are skipped.
pub(super) fn load_sublayouts(
    source: &dyn LayoutSource,
    context: &GenerationContext,
    policy: &SubLayoutPolicy,
) -> Result<Vec<LevelAsset>, GenerationError> {
    let mut loaded = Vec::new();
    for index in 0..policy.scan_limit {
        let name = context.sublayout_name(index);
        match source.load(&name) {
            Ok(asset) => loaded.push(asset),
            Err(LayoutError::NotFound(_)) => break,
            Err(err @ LayoutError::Invalid { .. }) => {
                warn!(%err, "skipping sub-layout");
            }
        }
    }

    if loaded.len() < policy.required {
        return Err(GenerationError::NotEnoughSubLayouts {
            level_set: context.level_set.clone(),
            found: loaded.len(),
            required: policy.required,
        });
    }
    Ok(loaded)
}

pub(super) struct CompositionContext<'a> {
    pub(super) map: &'a mut TileVolume,
    pub(super) entities: &'a mut EntityStore,
    pub(super) masks: &'a mut ExclusionMasks,
    pub(super) doors: &'a mut Vec<Door>,
    pub(super) guard_tertiary_room: bool,
}

/// Stamps the spawn, shop and secret sub-layouts at their anchors.
/// Returns the number of rooms composed.
pub(super) fn compose_rooms(
    context: &mut CompositionContext<'_>,
    sublayouts: &[LevelAsset],
    anchors: RoomAnchors,
) -> Result<usize, GenerationError> {
    let mut composed = 0;
    for (slot, (asset, anchor)) in sublayouts.iter().zip(anchors.in_order()).enumerate() {
        let first_room = slot == 0 || (slot == 2 && context.guard_tertiary_room);
        compose_sublayout(context, asset, anchor, first_room)?;
        composed += 1;
    }
    Ok(composed)
}

fn compose_sublayout(
    context: &mut CompositionContext<'_>,
    asset: &LevelAsset,
    anchor: Pos,
    first_room: bool,
) -> Result<(), GenerationError> {
    let fits = anchor.x >= 0
        && anchor.y >= 0
        && anchor.x as usize + asset.width <= context.map.width()
        && anchor.y as usize + asset.height <= context.map.height();
    if !fits {
        return Err(GenerationError::SubLayoutOutOfBounds {
            name: asset.name.clone(),
            anchor,
            width: context.map.width(),
            height: context.map.height(),
        });
    }

    let mut displaced = 0;
    for y in 0..asset.height as i32 {
        for x in 0..asset.width as i32 {
            let local = Pos { y, x };
            let pos = local.offset(anchor);
            for layer in 0..context.map.layers() {
                context.map.set_tile(layer, pos, asset.tile_at(layer, local));
            }

            if let Some(idx) = context.masks.cell(pos) {
                context.masks.placement_candidate[idx] = false;
                context.masks.no_trap[idx] |= asset.flags.disable_traps;
                context.masks.no_monster[idx] |= asset.flags.disable_monsters;
                context.masks.no_loot[idx] |= asset.flags.disable_loot;
                context.masks.first_room[idx] |= first_room;
            }
            displaced += context.entities.remove_at(pos);
        }
    }

    for placement in &asset.entities {
        context.entities.insert(Entity::new(
            placement.kind,
            placement.pos.offset(anchor),
            placement.role,
        ));
    }

    let doors = asset.edge_doors();
    let door_count = doors.len();
    context.doors.extend(doors.into_iter().map(|door| door.offset(anchor)));

    debug!(
        name = %asset.name,
        y = anchor.y,
        x = anchor.x,
        entities = asset.entities.len(),
        displaced,
        doors = door_count,
        "composed sub-layout"
    );
    Ok(())
}

/// Resets leftover placeholder tiles to the default passable tile.
pub(super) fn clean_placeholders(map: &mut TileVolume, placeholder: TileId) -> usize {
    let cleaned = map.replace_all(placeholder, TileId::EMPTY);
    if cleaned > 0 {
        warn!(cleaned, tile = placeholder.0, "reset placeholder tiles left after composition");
    }
    cleaned
}
