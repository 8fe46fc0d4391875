//! Loading Tiled-style JSON levels and their referenced tilesets

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{validate_level, validate_tile_set, Level, TileSet};

/// Errors raised while loading level or tileset files
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {path}: {message}")]
    Validation { path: PathBuf, message: String },
}

/// A tileset resolved from a level's reference list
#[derive(Debug, Clone)]
pub struct LoadedTileSet {
    pub first_gid: u32,
    pub tile_set: TileSet,
    /// Directory the tileset's image paths resolve against
    pub base_dir: PathBuf,
}

/// A level together with its resolved tilesets
#[derive(Debug, Clone)]
pub struct LoadedLevel {
    pub level: Level,
    pub tile_sets: Vec<LoadedTileSet>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.into(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LevelError::Parse {
        path: path.into(),
        source,
    })
}

/// Load a level file and every tileset it references
///
/// Tileset sources resolve relative to the level file's directory. Any io,
/// parse or validation failure aborts the whole load.
pub fn load_level(path: &Path) -> Result<LoadedLevel, LevelError> {
    let level: Level = read_json(path)?;
    validate_level(&level).map_err(|message| LevelError::Validation {
        path: path.into(),
        message,
    })?;

    let level_dir = path.parent().unwrap_or(Path::new("."));
    let mut tile_sets = Vec::new();
    for ts_ref in &level.tile_set_refs {
        let ts_path = level_dir.join(&ts_ref.source);
        let tile_set: TileSet = read_json(&ts_path)?;
        validate_tile_set(&tile_set).map_err(|message| LevelError::Validation {
            path: ts_path.clone(),
            message,
        })?;
        let base_dir = ts_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        tile_sets.push(LoadedTileSet {
            first_gid: ts_ref.first_gid,
            tile_set,
            base_dir,
        });
    }
    log::info!(
        "loaded level {:?}: {}x{} tiles, {} layers, {} tilesets",
        path,
        level.width,
        level.height,
        level.layers.len(),
        tile_sets.len()
    );
    Ok(LoadedLevel { level, tile_sets })
}
