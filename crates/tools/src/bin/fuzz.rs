use anyhow::{Result, bail};
use clap::Parser;
use mazegen::config::SpawnPolicy;
use mazegen::demo::{DEMO_LEVEL_SET, demo_layouts};
use mazegen::state::OBSTACLE_LAYER;
use mazegen::{GeneratedLevel, GenerationContext, MazeConfig, generate_level};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
}

fn check_invariants(config: &MazeConfig, level: &GeneratedLevel) -> Result<(), String> {
    let kinds = config.kinds;
    for entity in &level.entities {
        if !level.map.tile_at(OBSTACLE_LAYER, entity.pos).is_empty() {
            return Err(format!("entity inside wall: {entity:?}"));
        }
        if entity.kind != kinds.exit_anchor && level.masks.is_first_room(entity.pos) {
            return Err(format!("entity in first room: {entity:?}"));
        }
    }

    let mut cells: Vec<_> = level.entities.iter().map(|entity| entity.pos).collect();
    cells.sort();
    cells.dedup();
    if cells.len() != level.entities.len() {
        return Err("two entities share a cell".to_string());
    }
    if level.stats.monsters > config.spawns.forced_monsters {
        return Err("monster budget exceeded".to_string());
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    println!("Sweeping {} levels from seed {}...", args.runs, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut failures = 0;
    for run in 0..args.runs {
        let level_seed = rng.next_u32();
        let config = MazeConfig {
            spawns: SpawnPolicy {
                forced_monsters: (rng.next_u32() % 60) as usize,
                forced_loot: (rng.next_u32() % 30) as usize,
                gold_odds: rng.next_u32() % 10 + 1,
            },
            ..MazeConfig::default()
        };
        let layouts = demo_layouts(&config);
        let context = GenerationContext {
            secondary_exit: rng.next_u32() % 4 == 0,
            ..GenerationContext::new(DEMO_LEVEL_SET, level_seed)
        };

        let outcome = generate_level(&config, &layouts, &context)
            .map_err(|err| err.to_string())
            .and_then(|level| check_invariants(&config, &level).map(|()| level));
        match outcome {
            Ok(level) => info!(run, seed = level_seed, fingerprint = level.fingerprint(), "ok"),
            Err(reason) => {
                warn!(run, seed = level_seed, %reason, "invariant failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} runs failed", args.runs);
    }
    println!("Sweep completed successfully.");
    Ok(())
}
