//! Public data models for generated levels, exclusion masks and run statistics.

use xxhash_rust::xxh3::xxh3_64;

use crate::assets::LayoutFlags;
use crate::state::{Entity, TileVolume};
use crate::types::{Direction, Door, EntityKind, EntityRole, Pos};

/// Top-left corners of the three fixed rooms on the final map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomAnchors {
    pub spawn: Pos,
    pub shop: Pos,
    pub secret: Pos,
}

impl RoomAnchors {
    /// Anchors in composition order.
    pub fn in_order(&self) -> [Pos; 3] {
        [self.spawn, self.shop, self.secret]
    }
}

/// Per-cell placement restrictions over the final map footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionMasks {
    pub width: usize,
    pub height: usize,
    /// Free for trap and decoration placement. Cleared on composed rooms
    /// and a two-cell border.
    pub placement_candidate: Vec<bool>,
    pub no_trap: Vec<bool>,
    pub no_monster: Vec<bool>,
    pub no_loot: Vec<bool>,
    pub first_room: Vec<bool>,
}

impl ExclusionMasks {
    pub fn new(width: usize, height: usize, base: LayoutFlags) -> Self {
        let cells = width * height;
        let mut placement_candidate = vec![false; cells];
        for y in 2..height.saturating_sub(2) {
            for x in 2..width.saturating_sub(2) {
                placement_candidate[y * width + x] = true;
            }
        }
        Self {
            width,
            height,
            placement_candidate,
            no_trap: vec![false; cells],
            no_monster: vec![base.disable_monsters; cells],
            no_loot: vec![base.disable_loot; cells],
            first_room: vec![false; cells],
        }
    }

    pub fn cell(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        Some(pos.y as usize * self.width + pos.x as usize)
    }

    pub fn is_first_room(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|idx| self.first_room[idx])
    }

    pub fn excludes_monsters(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|idx| self.no_monster[idx])
    }

    pub fn excludes_loot(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|idx| self.no_loot[idx])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub rooms_composed: usize,
    pub carve_reconnections: usize,
    pub loop_walls_removed: usize,
    pub placeholder_tiles_cleaned: usize,
    pub exits: usize,
    pub exit_retries: usize,
    pub monsters: usize,
    pub gold: usize,
    pub items: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    pub map: TileVolume,
    /// Every entity of the level in creation order.
    pub entities: Vec<Entity>,
    pub doors: Vec<Door>,
    pub masks: ExclusionMasks,
    pub anchors: RoomAnchors,
    /// 0 for none, otherwise a designator for the level-progression system.
    pub secret_exit: u8,
    pub stats: GenerationStats,
}

impl GeneratedLevel {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.map.width() as u32).to_le_bytes());
        bytes.extend((self.map.height() as u32).to_le_bytes());
        bytes.extend((self.map.layers() as u32).to_le_bytes());
        for tile in self.map.tiles() {
            bytes.extend(tile.0.to_le_bytes());
        }

        bytes.extend((self.entities.len() as u32).to_le_bytes());
        for entity in &self.entities {
            bytes.extend(entity.kind.0.to_le_bytes());
            bytes.extend(entity.pos.y.to_le_bytes());
            bytes.extend(entity.pos.x.to_le_bytes());
            bytes.push(match entity.role {
                EntityRole::Object => 0,
                EntityRole::Monster => 1,
                EntityRole::Player => 2,
            });
            bytes.extend(entity.monster_index.unwrap_or(u32::MAX).to_le_bytes());
        }

        bytes.extend((self.doors.len() as u32).to_le_bytes());
        for door in &self.doors {
            bytes.extend(door.pos.y.to_le_bytes());
            bytes.extend(door.pos.x.to_le_bytes());
            bytes.push(match door.dir {
                Direction::East => 0,
                Direction::South => 1,
                Direction::West => 2,
                Direction::North => 3,
            });
        }

        for mask in [
            &self.masks.placement_candidate,
            &self.masks.no_trap,
            &self.masks.no_monster,
            &self.masks.no_loot,
            &self.masks.first_room,
        ] {
            bytes.extend(mask.iter().map(|&set| u8::from(set)));
        }

        for anchor in self.anchors.in_order() {
            bytes.extend(anchor.y.to_le_bytes());
            bytes.extend(anchor.x.to_le_bytes());
        }
        bytes.push(self.secret_exit);
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |entity| entity.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_masks_close_the_border_and_follow_level_flags() {
        let flags = LayoutFlags { disable_monsters: true, ..LayoutFlags::default() };
        let masks = ExclusionMasks::new(8, 6, flags);
        let open = masks.placement_candidate.iter().filter(|&&set| set).count();
        assert_eq!(open, 4 * 2);
        assert!(masks.placement_candidate[2 * 8 + 2]);
        assert!(!masks.placement_candidate[8 + 2]);
        assert!(masks.no_monster.iter().all(|&set| set));
        assert!(masks.no_loot.iter().all(|&set| !set));
        assert!(!masks.excludes_loot(Pos { y: 40, x: 40 }));
    }
}
