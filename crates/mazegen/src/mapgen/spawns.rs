//! Population planner: the level exit, forced monsters and forced loot.

use tracing::debug;

use crate::config::{GenerationContext, MazeConfig};
use crate::error::GenerationError;
use crate::state::{Entity, EntityStore, TileVolume};
use crate::terrain::{PathOracle, TerrainRules};
use crate::types::{EntityRole, Pos};

use super::model::ExclusionMasks;
use super::progression::{PlacementKind, SpawnBudget};
use super::seed::{RandomSource, pick_index};

pub(super) struct SpawnContext<'a> {
    pub(super) config: &'a MazeConfig,
    pub(super) generation: &'a GenerationContext,
    /// Name of the primary level; selects the exit kind and path checking.
    pub(super) map_name: &'a str,
    pub(super) map: &'a TileVolume,
    pub(super) masks: &'a ExclusionMasks,
    pub(super) terrain: &'a dyn TerrainRules,
    pub(super) paths: &'a dyn PathOracle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct PopulationSummary {
    pub(super) exits: usize,
    pub(super) exit_retries: usize,
    pub(super) monsters: usize,
    pub(super) gold: usize,
    pub(super) items: usize,
}

/// Cells still free for population, with a running count.
struct EligibleCells {
    width: usize,
    cells: Vec<bool>,
    count: usize,
}

impl EligibleCells {
    fn build(context: &SpawnContext<'_>, entities: &EntityStore) -> Self {
        let width = context.map.width();
        let height = context.map.height();
        let mut cells = vec![false; width * height];
        let mut count = 0;
        for y in 0..height {
            for x in 0..width {
                let pos = Pos { y: y as i32, x: x as i32 };
                let blocked = context.terrain.is_obstacle(context.map, pos)
                    || context.masks.is_first_room(pos)
                    || context.terrain.is_hazard(context.map, pos);
                if !blocked {
                    cells[y * width + x] = true;
                    count += 1;
                }
            }
        }

        let mut eligible = Self { width, cells, count };
        for (_, entity) in entities.iter() {
            eligible.remove(entity.pos);
        }
        eligible
    }

    fn count(&self) -> usize {
        self.count
    }

    /// The `pick`-th eligible cell in row-major order.
    fn nth(&self, pick: usize) -> Option<Pos> {
        let idx = self.cells.iter().enumerate().filter(|(_, open)| **open).nth(pick)?.0;
        Some(Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 })
    }

    fn remove(&mut self, pos: Pos) {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width {
            return;
        }
        let idx = pos.y as usize * self.width + pos.x as usize;
        if let Some(cell) = self.cells.get_mut(idx)
            && *cell
        {
            *cell = false;
            self.count -= 1;
        }
    }
}

/// Runs the forced-count placement loop. Every iteration consumes one
/// eligible cell; a rejected exit repeats its iteration on a fresh cell.
pub(super) fn populate(
    context: &SpawnContext<'_>,
    entities: &mut EntityStore,
    rng: &mut impl RandomSource,
) -> Result<PopulationSummary, GenerationError> {
    let mut eligible = EligibleCells::build(context, entities);
    let mut budget = SpawnBudget::new(&context.config.spawns, context.generation);
    let kinds = context.config.kinds;
    debug!(eligible = eligible.count(), iterations = budget.iterations(), "populating level");

    let mut summary = PopulationSummary::default();
    let mut next_monster_index = 0;
    let mut iteration = 0;
    while iteration < budget.iterations() {
        let remaining = budget.iterations() - iteration;
        if eligible.count() == 0 {
            return Err(GenerationError::PlacementExhausted { remaining });
        }
        let pick = pick_index(rng, eligible.count());
        let pos = eligible.nth(pick).ok_or(GenerationError::PlacementExhausted { remaining })?;

        let mut accepted = true;
        match budget.next_placement(iteration) {
            PlacementKind::Exit => {
                accepted = place_exit(context, entities, pos);
                if accepted {
                    summary.exits += 1;
                } else {
                    summary.exit_retries += 1;
                }
            }
            PlacementKind::Monster => {
                if !context.masks.excludes_monsters(pos) {
                    let mut monster = Entity::new(kinds.monster, pos, EntityRole::Monster);
                    monster.monster_index = Some(next_monster_index);
                    next_monster_index += 1;
                    entities.insert(monster);
                    summary.monsters += 1;
                }
            }
            PlacementKind::Loot => {
                if !context.masks.excludes_loot(pos) {
                    let gold_odds = context.config.spawns.gold_odds as usize;
                    if pick_index(rng, gold_odds) == 0 {
                        entities.insert(Entity::new(kinds.gold, pos, EntityRole::Object));
                        summary.gold += 1;
                    } else {
                        entities.insert(Entity::new(kinds.item, pos, EntityRole::Object));
                        summary.items += 1;
                    }
                }
            }
            PlacementKind::Nothing => {}
        }

        eligible.remove(pos);
        if accepted {
            iteration += 1;
        }
    }
    Ok(summary)
}

/// Places the exit at `pos` and keeps it only when the exit anchor can be
/// reached from there.
fn place_exit(context: &SpawnContext<'_>, entities: &mut EntityStore, pos: Pos) -> bool {
    let exits = &context.config.exits;
    let kinds = context.config.kinds;
    let kind = if exits.uses_portal(context.map_name) { kinds.portal } else { kinds.ladder };
    let id = entities.insert(Entity::new(kind, pos, EntityRole::Object));
    if !exits.checks_path(context.map_name) {
        return true;
    }

    let target = entities.first_of_kind(kinds.exit_anchor).map(|anchor| anchor.pos);
    match target {
        Some(target) if !context.paths.path_exists(context.map, pos, target) => {
            entities.remove(id);
            false
        }
        _ => true,
    }
}
