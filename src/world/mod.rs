//! Tile-map level data
//!
//! Read-only records parsed from Tiled-style JSON. A level is a grid of
//! layers holding 1-based tile gids (0 = empty) plus references to tileset
//! files; a tileset maps tile ids to individual image files.

pub mod tiled;

use serde::Deserialize;

use crate::geometry::Rect;

/// Validation limits for level and tileset files
pub mod limits {
    /// Maximum grid dimension (width or height) in tiles
    pub const MAX_GRID: u32 = 1024;
    /// Maximum tile pixel dimension
    pub const MAX_TILE_SIZE: u32 = 256;
    /// Maximum number of layers in a level
    pub const MAX_LAYERS: usize = 16;
    /// Maximum tiles in a tileset
    pub const MAX_TILES: usize = 4096;
}

/// A tile layer: a row-major array of 1-based gids, 0 meaning empty
#[derive(Debug, Clone, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u32>,
}

impl Layer {
    /// Gid at column `i`, row `j`
    pub fn gid_at(&self, i: u32, j: u32) -> Option<u32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        self.data.get((j * self.width + i) as usize).copied()
    }
}

/// Reference to a tileset file, resolved relative to the level file
#[derive(Debug, Clone, Deserialize)]
pub struct TileSetRef {
    #[serde(rename = "firstgid")]
    pub first_gid: u32,
    pub source: String,
}

/// A parsed level grid
#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    pub layers: Vec<Layer>,
    #[serde(rename = "tilesets", default)]
    pub tile_set_refs: Vec<TileSetRef>,
}

impl Level {
    /// Full level extent in pixels, anchored at the origin
    pub fn pixel_bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            (self.width * self.tile_width) as i32,
            (self.height * self.tile_height) as i32,
        )
    }
}

/// One tile record inside a tileset
#[derive(Debug, Clone, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub image: String,
    #[serde(rename = "imagewidth")]
    pub image_width: u32,
    #[serde(rename = "imageheight")]
    pub image_height: u32,
}

/// A tileset: a collection of individually-imaged tiles
#[derive(Debug, Clone, Deserialize)]
pub struct TileSet {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    #[serde(rename = "tilecount", default)]
    pub tile_count: u32,
    pub tiles: Vec<Tile>,
}

/// Validate a single layer
fn validate_layer(layer: &Layer, context: &str) -> Result<(), String> {
    if layer.width == 0 || layer.height == 0 {
        return Err(format!("{}: empty grid", context));
    }
    if layer.width > limits::MAX_GRID || layer.height > limits::MAX_GRID {
        return Err(format!(
            "{}: grid {}x{} exceeds {}",
            context,
            layer.width,
            layer.height,
            limits::MAX_GRID
        ));
    }
    let expected = (layer.width * layer.height) as usize;
    if layer.data.len() != expected {
        return Err(format!(
            "{}: data length {} does not match {}x{}",
            context,
            layer.data.len(),
            layer.width,
            layer.height
        ));
    }
    Ok(())
}

/// Validate a parsed level
pub fn validate_level(level: &Level) -> Result<(), String> {
    if level.width == 0 || level.height == 0 {
        return Err("level grid is empty".to_string());
    }
    if level.width > limits::MAX_GRID || level.height > limits::MAX_GRID {
        return Err(format!(
            "level grid {}x{} exceeds {}",
            level.width,
            level.height,
            limits::MAX_GRID
        ));
    }
    if level.tile_width == 0
        || level.tile_height == 0
        || level.tile_width > limits::MAX_TILE_SIZE
        || level.tile_height > limits::MAX_TILE_SIZE
    {
        return Err(format!(
            "tile size {}x{} out of range",
            level.tile_width, level.tile_height
        ));
    }
    if level.layers.len() > limits::MAX_LAYERS {
        return Err(format!(
            "too many layers ({} > {})",
            level.layers.len(),
            limits::MAX_LAYERS
        ));
    }
    for (i, layer) in level.layers.iter().enumerate() {
        validate_layer(layer, &format!("layer[{}] '{}'", i, layer.name))?;
    }
    for (i, ts_ref) in level.tile_set_refs.iter().enumerate() {
        if ts_ref.source.is_empty() {
            return Err(format!("tileset[{}] has an empty source", i));
        }
        if ts_ref.first_gid == 0 {
            return Err(format!("tileset[{}] has firstgid 0; gids are 1-based", i));
        }
    }
    Ok(())
}

/// Validate a parsed tileset
pub fn validate_tile_set(tile_set: &TileSet) -> Result<(), String> {
    if tile_set.tile_width == 0
        || tile_set.tile_height == 0
        || tile_set.tile_width > limits::MAX_TILE_SIZE
        || tile_set.tile_height > limits::MAX_TILE_SIZE
    {
        return Err(format!(
            "tileset '{}': tile size {}x{} out of range",
            tile_set.name, tile_set.tile_width, tile_set.tile_height
        ));
    }
    if tile_set.tiles.len() > limits::MAX_TILES {
        return Err(format!(
            "tileset '{}': too many tiles ({} > {})",
            tile_set.name,
            tile_set.tiles.len(),
            limits::MAX_TILES
        ));
    }
    // tilecount 0 means the field was absent from the file
    if tile_set.tile_count != 0 && tile_set.tile_count as usize != tile_set.tiles.len() {
        return Err(format!(
            "tileset '{}': tilecount {} does not match {} tiles",
            tile_set.name,
            tile_set.tile_count,
            tile_set.tiles.len()
        ));
    }
    for tile in &tile_set.tiles {
        if tile.image.is_empty() {
            return Err(format!(
                "tileset '{}': tile {} has an empty image",
                tile_set.name, tile.id
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(width: u32, height: u32, data: Vec<u32>) -> Layer {
        Layer {
            name: "ground".to_string(),
            width,
            height,
            data,
        }
    }

    #[test]
    fn test_gid_lookup_is_row_major() {
        let l = layer(3, 2, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(l.gid_at(0, 0), Some(1));
        assert_eq!(l.gid_at(2, 0), Some(3));
        assert_eq!(l.gid_at(0, 1), Some(4));
        assert_eq!(l.gid_at(2, 1), Some(6));
        assert_eq!(l.gid_at(3, 0), None);
        assert_eq!(l.gid_at(0, 2), None);
    }

    #[test]
    fn test_layer_data_length_must_match_grid() {
        let level = Level {
            width: 2,
            height: 2,
            tile_width: 16,
            tile_height: 16,
            layers: vec![layer(2, 2, vec![1, 0, 0])],
            tile_set_refs: Vec::new(),
        };
        let err = validate_level(&level).unwrap_err();
        assert!(err.contains("data length"), "unexpected message: {}", err);
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        let level = Level {
            width: 2,
            height: 2,
            tile_width: 0,
            tile_height: 16,
            layers: Vec::new(),
            tile_set_refs: Vec::new(),
        };
        assert!(validate_level(&level).is_err());
    }

    #[test]
    fn test_pixel_bounds() {
        let level = Level {
            width: 20,
            height: 15,
            tile_width: 32,
            tile_height: 32,
            layers: Vec::new(),
            tile_set_refs: Vec::new(),
        };
        assert_eq!(level.pixel_bounds(), Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn test_tileset_count_must_match_tiles() {
        let mut tile_set = TileSet {
            name: "terrain".to_string(),
            tile_width: 32,
            tile_height: 32,
            tile_count: 2,
            tiles: vec![Tile {
                id: 0,
                image: "grass.png".to_string(),
                image_width: 32,
                image_height: 32,
            }],
        };
        let err = validate_tile_set(&tile_set).unwrap_err();
        assert!(err.contains("tilecount"), "unexpected message: {}", err);

        // An absent count (serde default) is not checked
        tile_set.tile_count = 0;
        assert!(validate_tile_set(&tile_set).is_ok());

        tile_set.tile_count = 1;
        assert!(validate_tile_set(&tile_set).is_ok());
    }

    #[test]
    fn test_tileset_rejects_empty_image() {
        let tile_set = TileSet {
            name: "terrain".to_string(),
            tile_width: 32,
            tile_height: 32,
            tile_count: 1,
            tiles: vec![Tile {
                id: 0,
                image: String::new(),
                image_width: 32,
                image_height: 32,
            }],
        };
        assert!(validate_tile_set(&tile_set).is_err());
    }
}
