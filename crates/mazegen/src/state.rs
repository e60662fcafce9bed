use slotmap::SlotMap;

use crate::types::*;

pub const FLOOR_LAYER: usize = 0;
pub const OBSTACLE_LAYER: usize = 1;

/// Layered tile map. Each layer is a row-major `width x height` plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileVolume {
    width: usize,
    height: usize,
    layers: usize,
    tiles: Vec<TileId>,
}

impl TileVolume {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self { width, height, layers, tiles: vec![TileId::EMPTY; width * height * layers] }
    }

    /// Builds a volume from layer-major tiles; `None` when the length is off.
    pub fn from_tiles(
        width: usize,
        height: usize,
        layers: usize,
        tiles: Vec<TileId>,
    ) -> Option<Self> {
        (tiles.len() == width * height * layers).then_some(Self { width, height, layers, tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos` on `layer`; `EMPTY` outside the volume.
    pub fn tile_at(&self, layer: usize, pos: Pos) -> TileId {
        match self.index(layer, pos) {
            Some(idx) => self.tiles[idx],
            None => TileId::EMPTY,
        }
    }

    pub fn set_tile(&mut self, layer: usize, pos: Pos, tile: TileId) {
        if let Some(idx) = self.index(layer, pos) {
            self.tiles[idx] = tile;
        }
    }

    pub fn layer(&self, layer: usize) -> &[TileId] {
        let plane = self.width * self.height;
        if layer >= self.layers {
            return &[];
        }
        &self.tiles[layer * plane..(layer + 1) * plane]
    }

    /// Replaces every `from` tile on every layer and returns how many changed.
    pub fn replace_all(&mut self, from: TileId, to: TileId) -> usize {
        let mut replaced = 0;
        for tile in self.tiles.iter_mut().filter(|tile| **tile == from) {
            *tile = to;
            replaced += 1;
        }
        replaced
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn cell_index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    fn index(&self, layer: usize, pos: Pos) -> Option<usize> {
        if layer >= self.layers {
            return None;
        }
        self.cell_index(pos).map(|cell| layer * self.width * self.height + cell)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Pos,
    pub role: EntityRole,
    /// Sequential index assigned to generated monsters.
    pub monster_index: Option<u32>,
}

impl Entity {
    pub fn new(kind: EntityKind, pos: Pos, role: EntityRole) -> Self {
        Self { kind, pos, role, monster_index: None }
    }
}

/// Entities of the level under construction, iterated in creation order.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    /// Removes every entity standing on `pos` and returns how many were removed.
    pub fn remove_at(&mut self, pos: Pos) -> usize {
        let doomed: Vec<EntityId> =
            self.iter().filter(|(_, entity)| entity.pos == pos).map(|(id, _)| id).collect();
        for id in &doomed {
            self.entities.remove(*id);
        }
        self.order.retain(|id| !doomed.contains(id));
        doomed.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.order.iter().filter_map(|&id| self.entities.get(id).map(|entity| (id, entity)))
    }

    pub fn first_of_kind(&self, kind: EntityKind) -> Option<&Entity> {
        self.iter().map(|(_, entity)| entity).find(|entity| entity.kind == kind)
    }

    /// Snapshot in creation order.
    pub fn to_vec(&self) -> Vec<Entity> {
        self.iter().map(|(_, entity)| *entity).collect()
    }
}
