//! Pre-authored level assets and the source they are loaded from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::state::{OBSTACLE_LAYER, TileVolume};
use crate::types::{Direction, Door, EntityKind, EntityRole, Pos, TileId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutFlags {
    pub disable_traps: bool,
    pub disable_monsters: bool,
    pub disable_loot: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPlacement {
    pub kind: EntityKind,
    pub pos: Pos,
    #[serde(default)]
    pub role: EntityRole,
}

/// A hand-authored map: either the primary level of a set or one of its
/// fixed sub-layouts. Tiles are layer-major, each layer row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAsset {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub layers: usize,
    pub tiles: Vec<TileId>,
    #[serde(default)]
    pub entities: Vec<EntityPlacement>,
    #[serde(default)]
    pub flags: LayoutFlags,
}

impl LevelAsset {
    /// An asset with `layers` empty layers and no entities.
    pub fn blank(name: impl Into<String>, width: usize, height: usize, layers: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            layers,
            tiles: vec![TileId::EMPTY; width * height * layers],
            entities: Vec::new(),
            flags: LayoutFlags::default(),
        }
    }

    pub fn check(&self) -> Result<(), LayoutError> {
        let invalid = |reason: String| LayoutError::Invalid { name: self.name.clone(), reason };
        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!("empty {}x{} grid", self.width, self.height)));
        }
        if self.layers <= OBSTACLE_LAYER {
            return Err(invalid(format!("{} layers, an obstacle layer is required", self.layers)));
        }
        let expected = self.width * self.height * self.layers;
        if self.tiles.len() != expected {
            return Err(invalid(format!("{} tiles, expected {expected}", self.tiles.len())));
        }
        Ok(())
    }

    pub fn volume(&self) -> Result<TileVolume, LayoutError> {
        self.check()?;
        TileVolume::from_tiles(self.width, self.height, self.layers, self.tiles.clone())
            .ok_or_else(|| LayoutError::Invalid {
                name: self.name.clone(),
                reason: "tile count mismatch".to_string(),
            })
    }

    pub fn tile_at(&self, layer: usize, pos: Pos) -> TileId {
        if layer >= self.layers
            || pos.x < 0
            || pos.y < 0
            || pos.x as usize >= self.width
            || pos.y as usize >= self.height
        {
            return TileId::EMPTY;
        }
        let idx = layer * self.width * self.height + pos.y as usize * self.width + pos.x as usize;
        self.tiles.get(idx).copied().unwrap_or(TileId::EMPTY)
    }

    pub fn set_tile(&mut self, layer: usize, pos: Pos, tile: TileId) {
        if layer >= self.layers
            || pos.x < 0
            || pos.y < 0
            || pos.x as usize >= self.width
            || pos.y as usize >= self.height
        {
            return;
        }
        let idx = layer * self.width * self.height + pos.y as usize * self.width + pos.x as usize;
        if let Some(slot) = self.tiles.get_mut(idx) {
            *slot = tile;
        }
    }

    /// Border cells without an obstacle are exits, in row-major order.
    /// Corners take the first matching side of east, south, west, north.
    pub fn edge_doors(&self) -> Vec<Door> {
        let mut doors = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let on_border = x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1;
                let pos = Pos { y: y as i32, x: x as i32 };
                if !on_border || !self.tile_at(OBSTACLE_LAYER, pos).is_empty() {
                    continue;
                }
                let dir = if x == self.width - 1 {
                    Direction::East
                } else if y == self.height - 1 {
                    Direction::South
                } else if x == 0 {
                    Direction::West
                } else {
                    Direction::North
                };
                doors.push(Door { pos, dir });
            }
        }
        doors
    }
}

/// Synchronous access to pre-authored level assets by name.
pub trait LayoutSource {
    /// `NotFound` means no asset of that name exists; `Invalid` means one
    /// exists but cannot be used.
    fn load(&self, name: &str) -> Result<LevelAsset, LayoutError>;
}

impl<S: LayoutSource + ?Sized> LayoutSource for &S {
    fn load(&self, name: &str) -> Result<LevelAsset, LayoutError> {
        (**self).load(name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryLayouts {
    assets: BTreeMap<String, LevelAsset>,
}

impl InMemoryLayouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: LevelAsset) {
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn with(mut self, asset: LevelAsset) -> Self {
        self.insert(asset);
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl FromIterator<LevelAsset> for InMemoryLayouts {
    fn from_iter<I: IntoIterator<Item = LevelAsset>>(iter: I) -> Self {
        let mut layouts = Self::new();
        for asset in iter {
            layouts.insert(asset);
        }
        layouts
    }
}

impl LayoutSource for InMemoryLayouts {
    fn load(&self, name: &str) -> Result<LevelAsset, LayoutError> {
        let asset =
            self.assets.get(name).cloned().ok_or_else(|| LayoutError::NotFound(name.to_string()))?;
        asset.check()?;
        Ok(asset)
    }
}
