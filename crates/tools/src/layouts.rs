//! Level assets stored as `<name>.json` files in one directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mazegen::demo::{DEMO_LEVEL_SET, demo_layouts};
use mazegen::{GenerationContext, LayoutError, LayoutSource, LevelAsset, MazeConfig};
use tracing::debug;

pub struct DirectoryLayouts {
    root: PathBuf,
}

impl DirectoryLayouts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl LayoutSource for DirectoryLayouts {
    fn load(&self, name: &str) -> Result<LevelAsset, LayoutError> {
        let path = self.path_for(name);
        let invalid = |reason: String| LayoutError::Invalid { name: name.to_string(), reason };
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LayoutError::NotFound(name.to_string()));
            }
            Err(err) => return Err(invalid(format!("{}: {err}", path.display()))),
        };
        let asset: LevelAsset =
            serde_json::from_str(&data).map_err(|err| invalid(format!("bad JSON: {err}")))?;
        if asset.name != name {
            return Err(invalid(format!("file declares name '{}'", asset.name)));
        }
        asset.check()?;
        debug!(name, path = %path.display(), "loaded level asset");
        Ok(asset)
    }
}

/// Writes the built-in demo set to `dir`, one JSON file per asset.
pub fn export_demo(config: &MazeConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let layouts = demo_layouts(config);
    let naming = GenerationContext::new(DEMO_LEVEL_SET, 0);
    let names = [
        DEMO_LEVEL_SET.to_string(),
        naming.sublayout_name(0),
        naming.sublayout_name(1),
        naming.sublayout_name(2),
    ];

    let mut written = Vec::new();
    for name in names {
        let asset = layouts.load(&name).with_context(|| format!("demo asset '{name}' missing"))?;
        let path = dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(&asset)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
