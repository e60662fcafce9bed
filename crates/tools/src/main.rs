mod layouts;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mazegen::config::EntityKinds;
use mazegen::demo::{DEMO_LEVEL_SET, demo_layouts};
use mazegen::state::OBSTACLE_LAYER;
use mazegen::{GeneratedLevel, GenerationContext, LayoutSource, MazeConfig, Pos, generate_level};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::layouts::{DirectoryLayouts, export_demo};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u32,
    /// Level set to generate; the primary layout and its sub-layouts share this prefix
    #[arg(short, long, default_value = DEMO_LEVEL_SET)]
    level_set: String,
    /// Directory of `<name>.json` level assets; the built-in demo set when omitted
    #[arg(long)]
    levels: Option<PathBuf>,
    /// TOML file overriding the default generation settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Place a second exit
    #[arg(long)]
    secondary_exit: bool,
    /// Print the obstacle layer and entities as text
    #[arg(long)]
    dump: bool,
    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,
    /// Write the demo level set to this directory and exit
    #[arg(long)]
    export_demo: Option<PathBuf>,
}

#[derive(Serialize)]
struct LevelReport {
    level_set: String,
    seed: u32,
    fingerprint: u64,
    width: usize,
    height: usize,
    entities: usize,
    doors: usize,
    exits: usize,
    exit_retries: usize,
    monsters: usize,
    gold: usize,
    items: usize,
    loop_walls_removed: usize,
    carve_reconnections: usize,
}

impl LevelReport {
    fn new(context: &GenerationContext, level: &GeneratedLevel) -> Self {
        Self {
            level_set: context.level_set.clone(),
            seed: context.seed,
            fingerprint: level.fingerprint(),
            width: level.map.width(),
            height: level.map.height(),
            entities: level.entities.len(),
            doors: level.doors.len(),
            exits: level.stats.exits,
            exit_retries: level.stats.exit_retries,
            monsters: level.stats.monsters,
            gold: level.stats.gold,
            items: level.stats.items,
            loop_walls_removed: level.stats.loop_walls_removed,
            carve_reconnections: level.stats.carve_reconnections,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<MazeConfig> {
    let Some(path) = path else {
        return Ok(MazeConfig::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: MazeConfig = toml::from_str(&data)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// One character per cell: `#` wall, `.` open, then entities on top.
fn render(level: &GeneratedLevel, kinds: &EntityKinds) -> String {
    let width = level.map.width();
    let height = level.map.height();
    let mut cells: Vec<char> = (0..height * width)
        .map(|idx| {
            let pos = Pos { y: (idx / width) as i32, x: (idx % width) as i32 };
            if level.map.tile_at(OBSTACLE_LAYER, pos).is_empty() { '.' } else { '#' }
        })
        .collect();

    for entity in &level.entities {
        let glyph = match entity.kind {
            kind if kind == kinds.exit_anchor => '@',
            kind if kind == kinds.ladder || kind == kinds.portal => '>',
            kind if kind == kinds.monster => 'M',
            kind if kind == kinds.gold => '$',
            kind if kind == kinds.item => '!',
            _ => '?',
        };
        if let Some(idx) = level.map.cell_index(entity.pos) {
            cells[idx] = glyph;
        }
    }

    let mut out = String::with_capacity(height * (width + 1));
    for row in cells.chunks(width) {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    if let Some(dir) = &args.export_demo {
        let written = export_demo(&config, dir)?;
        info!(files = written.len(), dir = %dir.display(), "exported demo level set");
        for path in written {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let layouts: Box<dyn LayoutSource> = match &args.levels {
        Some(dir) => Box::new(DirectoryLayouts::new(dir)),
        None => Box::new(demo_layouts(&config)),
    };
    let context = GenerationContext {
        secondary_exit: args.secondary_exit,
        ..GenerationContext::new(args.level_set.as_str(), args.seed)
    };

    let level = generate_level(&config, layouts.as_ref(), &context)
        .with_context(|| format!("Generation failed for level set '{}'", context.level_set))?;
    let report = LevelReport::new(&context, &level);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Level set: {} (seed {})", report.level_set, report.seed);
        println!("Size: {}x{}", report.width, report.height);
        println!(
            "Entities: {} (exits {}, monsters {}, gold {}, items {})",
            report.entities, report.exits, report.monsters, report.gold, report.items
        );
        println!("Doors: {}", report.doors);
        println!("Fingerprint: {}", report.fingerprint);
    }
    if args.dump {
        print!("{}", render(&level, &config.kinds));
    }

    Ok(())
}
