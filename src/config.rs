//! Game configuration loaded from a RON file
//!
//! Missing file means defaults; a file that exists but fails to parse is an
//! error, so startup typos are not silently masked.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::Point;

/// Config file looked up in the working directory
pub const CONFIG_PATH: &str = "config.ron";

/// Errors raised while loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Window settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            title: "Tilequest".to_string(),
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Level file loaded at startup
    pub level: PathBuf,
    /// Directory watched for behavior scripts
    pub scripts: PathBuf,
    pub player_spawn: Point,
    pub enemy_spawns: Vec<Point>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            level: PathBuf::from("assets/levels/demo.json"),
            scripts: PathBuf::from("assets/scripts"),
            player_spawn: Point::new(240, 240),
            enemy_spawns: vec![Point::new(480, 160), Point::new(160, 400)],
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    /// Best-effort load for contexts that cannot surface errors
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("config {:?} unusable ({}), using defaults", path, e);
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.level, PathBuf::from("assets/levels/demo.json"));
    }

    #[test]
    fn test_parses_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ron");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            br#"(
                window: ( width: 640, height: 400, title: "Test" ),
                player_spawn: ( x: 10, y: 20 ),
            )"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.title, "Test");
        assert_eq!(config.player_spawn, Point::new(10, 20));
        // Unspecified fields keep their defaults
        assert_eq!(config.scripts, PathBuf::from("assets/scripts"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ron");
        fs::write(&path, "( window: oops").unwrap();
        assert!(Config::load(&path).is_err());
        // Best-effort loader falls back instead
        let config = Config::load_or_default(&path);
        assert_eq!(config.window.width, 800);
    }
}
