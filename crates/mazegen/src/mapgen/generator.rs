//! High-level maze level orchestration: pre-level, room composition and population.

mod prelevel;

use tracing::{info, warn};

use crate::assets::LayoutSource;
use crate::config::{GenerationContext, MazeConfig};
use crate::error::GenerationError;
use crate::state::{Entity, EntityStore};
use crate::terrain::{PathOracle, TerrainRules};

use self::prelevel::{build_prelevel, project_onto_map};
use super::model::{ExclusionMasks, GeneratedLevel, GenerationStats};
use super::seed::MapRng;
use super::spawns::{SpawnContext, populate};
use super::vaults::{CompositionContext, clean_placeholders, compose_rooms, load_sublayouts};

pub struct MazeGenerator<'a> {
    config: &'a MazeConfig,
    layouts: &'a dyn LayoutSource,
    terrain: &'a dyn TerrainRules,
    paths: &'a dyn PathOracle,
}

impl<'a> MazeGenerator<'a> {
    pub fn new(
        config: &'a MazeConfig,
        layouts: &'a dyn LayoutSource,
        terrain: &'a dyn TerrainRules,
        paths: &'a dyn PathOracle,
    ) -> Self {
        Self { config, layouts, terrain, paths }
    }

    /// Builds one maze level. All randomness comes from a single stream
    /// seeded with `context.seed`, so equal inputs give equal levels.
    pub fn generate(&self, context: &GenerationContext) -> Result<GeneratedLevel, GenerationError> {
        self.config.validate()?;
        info!(
            level_set = %context.level_set,
            level = context.level_index,
            seed = context.seed,
            "generating maze level"
        );

        let primary = self.layouts.load(&context.level_set).map_err(|err| {
            warn!(%err, "primary layout unavailable");
            GenerationError::PrimaryLayoutMissing { level_set: context.level_set.clone() }
        })?;
        let mut map = primary.volume().map_err(|_| GenerationError::PrimaryLayoutMissing {
            level_set: context.level_set.clone(),
        })?;

        let mut rng = MapRng::seeded(context.seed);
        let sublayouts = load_sublayouts(self.layouts, context, &self.config.sublayouts)?;

        let plan = build_prelevel(self.config, &mut rng)?;
        project_onto_map(&plan.level, &mut map, self.config.tiles.maze_wall);

        let mut entities = EntityStore::new();
        for placement in &primary.entities {
            entities.insert(Entity::new(placement.kind, placement.pos, placement.role));
        }

        let anchors = plan.anchors();
        let mut masks = ExclusionMasks::new(map.width(), map.height(), primary.flags);
        let mut doors = Vec::new();
        let rooms_composed = compose_rooms(
            &mut CompositionContext {
                map: &mut map,
                entities: &mut entities,
                masks: &mut masks,
                doors: &mut doors,
                guard_tertiary_room: context.guard_tertiary_room,
            },
            &sublayouts,
            anchors,
        )?;
        let placeholder_tiles_cleaned = clean_placeholders(&mut map, self.config.tiles.placeholder);

        let population = populate(
            &SpawnContext {
                config: self.config,
                generation: context,
                map_name: &primary.name,
                map: &map,
                masks: &masks,
                terrain: self.terrain,
                paths: self.paths,
            },
            &mut entities,
            &mut rng,
        )?;

        let stats = GenerationStats {
            rooms_composed,
            carve_reconnections: plan.carve.reconnections,
            loop_walls_removed: plan.loops_opened,
            placeholder_tiles_cleaned,
            exits: population.exits,
            exit_retries: population.exit_retries,
            monsters: population.monsters,
            gold: population.gold,
            items: population.items,
        };
        info!(
            entities = entities.len(),
            doors = doors.len(),
            monsters = stats.monsters,
            exit_retries = stats.exit_retries,
            "maze level ready"
        );

        Ok(GeneratedLevel {
            map,
            entities: entities.to_vec(),
            doors,
            masks,
            anchors,
            secret_exit: context.secret_exit,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use proptest::prelude::*;

    use super::*;
    use crate::assets::{InMemoryLayouts, LevelAsset};
    use crate::config::SpawnPolicy;
    use crate::demo::{DEMO_LEVEL_SET, demo_layouts};
    use crate::state::{OBSTACLE_LAYER, TileVolume};
    use crate::terrain::{GridPathfinder, TileTerrain};
    use crate::types::{EntityKind, EntityRole, Pos, TileId};

    fn generate_with(
        config: &MazeConfig,
        layouts: &dyn LayoutSource,
        context: &GenerationContext,
    ) -> Result<GeneratedLevel, GenerationError> {
        let terrain = TileTerrain::from_rules(&config.tiles);
        MazeGenerator::new(config, layouts, &terrain, &GridPathfinder).generate(context)
    }

    fn generate_demo(seed: u32) -> GeneratedLevel {
        let config = MazeConfig::default();
        let layouts = demo_layouts(&config);
        generate_with(&config, &layouts, &GenerationContext::new(DEMO_LEVEL_SET, seed))
            .expect("demo level set generates")
    }

    fn reachable_open_cells(map: &TileVolume, start: Pos) -> BTreeSet<Pos> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = Pos { y: pos.y + dy, x: pos.x + dx };
                if map.in_bounds(next)
                    && map.tile_at(OBSTACLE_LAYER, next).is_empty()
                    && seen.insert(next)
                {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn same_inputs_produce_byte_identical_levels() {
        let a = generate_demo(123_456);
        let b = generate_demo(123_456);
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_produce_different_levels() {
        assert_ne!(generate_demo(1).fingerprint(), generate_demo(2).fingerprint());
    }

    #[test]
    fn default_run_places_one_exit_and_the_forced_monsters() {
        let level = generate_demo(31_337);
        let kinds = MazeConfig::default().kinds;
        assert_eq!(level.entities_of(kinds.ladder).count(), 1);
        assert_eq!(level.stats.exits, 1);
        assert_eq!(level.stats.rooms_composed, 3);

        // The demo shop disables monsters, so some forced spawns may be dropped.
        let monsters: Vec<&Entity> = level.entities_of(kinds.monster).collect();
        assert_eq!(monsters.len(), level.stats.monsters);
        assert!(monsters.len() <= 33);
        let indices: Vec<u32> = monsters.iter().filter_map(|m| m.monster_index).collect();
        assert_eq!(indices, (0..monsters.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn exit_is_reachable_from_the_player_start() {
        for seed in [3, 17, 2_024, 65_535] {
            let level = generate_demo(seed);
            let kinds = MazeConfig::default().kinds;
            let player = level.entities_of(kinds.exit_anchor).next().expect("player start");
            assert_eq!(player.role, EntityRole::Player);
            let exit = level.entities_of(kinds.ladder).next().expect("exit placed");
            assert!(reachable_open_cells(&level.map, player.pos).contains(&exit.pos));
        }
    }

    #[test]
    fn nothing_spawns_inside_the_first_room() {
        let level = generate_demo(99);
        let kinds = MazeConfig::default().kinds;
        for entity in &level.entities {
            if entity.kind == kinds.exit_anchor {
                continue;
            }
            assert!(!level.masks.is_first_room(entity.pos), "{entity:?} inside the spawn room");
        }
    }

    #[test]
    fn composed_doors_sit_on_room_edges_at_the_anchors() {
        let level = generate_demo(4_096);
        let config = MazeConfig::default();
        let spawn = level.anchors.spawn;
        let expected_north = Pos { y: spawn.y, x: spawn.x + 5 };
        assert!(level.doors.iter().any(|door| door.pos == expected_north));
        for door in &level.doors {
            assert!(level.map.tile_at(OBSTACLE_LAYER, door.pos).is_empty());
            assert!(level.map.tile_at(OBSTACLE_LAYER, door.threshold()).is_empty());
        }
        let expected: usize = config
            .rooms
            .named()
            .iter()
            .map(|(_, blueprint)| blueprint.doors.iter().count())
            .sum();
        assert_eq!(level.doors.len(), expected);
    }

    #[test]
    fn missing_primary_layout_is_fatal() {
        let config = MazeConfig::default();
        let layouts = demo_layouts(&config);
        assert_eq!(
            generate_with(&config, &layouts, &GenerationContext::new("nowhere", 1)),
            Err(GenerationError::PrimaryLayoutMissing { level_set: "nowhere".to_string() })
        );
    }

    #[test]
    fn too_few_sublayouts_is_fatal() {
        let config = MazeConfig::default();
        let layouts = InMemoryLayouts::new()
            .with(LevelAsset::blank("sparse", 48, 48, 2))
            .with(LevelAsset::blank("sparse00", 9, 9, 2));
        assert!(matches!(
            generate_with(&config, &layouts, &GenerationContext::new("sparse", 1)),
            Err(GenerationError::NotEnoughSubLayouts { found: 1, required: 3, .. })
        ));
    }

    #[test]
    fn secret_exit_and_secondary_exit_flow_through() {
        let config = MazeConfig::default();
        let layouts = demo_layouts(&config);
        let context = GenerationContext {
            secondary_exit: true,
            secret_exit: 2,
            ..GenerationContext::new(DEMO_LEVEL_SET, 808)
        };
        let level = generate_with(&config, &layouts, &context).expect("demo generates");
        assert_eq!(level.secret_exit, 2);
        assert_eq!(level.entities_of(config.kinds.ladder).count(), 2);
    }

    #[test]
    fn obstacle_layer_holds_only_walls_and_open_cells() {
        let level = generate_demo(555);
        let wall = MazeConfig::default().tiles.maze_wall;
        for tile in level.map.layer(OBSTACLE_LAYER) {
            assert!(tile.is_empty() || *tile == wall, "unexpected obstacle {tile:?}");
        }
        assert_eq!(level.map.tile_at(OBSTACLE_LAYER, Pos { y: 0, x: 0 }), wall);
        assert_eq!(level.map.tile_at(OBSTACLE_LAYER, Pos { y: 1, x: 1 }), TileId::EMPTY);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn loot_only_budget_yields_gold_or_items(seed in any::<u32>(), loot in 1_usize..20) {
            let config = MazeConfig {
                spawns: SpawnPolicy { forced_monsters: 0, forced_loot: loot, gold_odds: 4 },
                ..MazeConfig::default()
            };
            let layouts = demo_layouts(&config);
            let context = GenerationContext::new(DEMO_LEVEL_SET, seed);
            let level = generate_with(&config, &layouts, &context).expect("demo generates");
            let gold = level.entities_of(config.kinds.gold).count();
            let items = level.entities_of(config.kinds.item).count();
            prop_assert_eq!(gold, level.stats.gold);
            prop_assert_eq!(items, level.stats.items);
            prop_assert!(gold + items <= loot);
            prop_assert_eq!(level.entities_of(EntityKind(10)).count(), 0);
        }
    }
}
