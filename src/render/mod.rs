//! Texture store and draw-call contract
//!
//! The game core never talks to the GPU directly: it emits draw calls
//! through the [`RenderTarget`] trait with screen-space coordinates already
//! applied. The macroquad-backed [`Renderer`] is the only implementation
//! used at runtime; tests record the calls instead.

use std::fs;
use std::path::Path;

use macroquad::prelude::{
    clear_background, draw_texture_ex, vec2, DrawTextureParams, FilterMode, Texture2D, BLACK,
    WHITE,
};
use thiserror::Error;

use crate::geometry::{Point, Rect};

/// Handle to a texture owned by the [`Renderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Mirror applied when blitting a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
}

/// Orientation parameters for a draw call
///
/// `angle` is in degrees, rotating around `rotation_center` expressed
/// relative to the destination rectangle's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawParams {
    pub flip: Flip,
    pub angle: f64,
    pub rotation_center: Point,
}

/// Sink for screen-space draw calls
pub trait RenderTarget {
    /// Draw `src` (a sub-rectangle of `texture`) into the screen-space `dst`
    fn render_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, params: DrawParams);
}

/// Errors raised while loading textures
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

struct LoadedTexture {
    texture: Texture2D,
    width: u32,
    height: u32,
}

/// GPU-backed texture store and draw-call sink
#[derive(Default)]
pub struct Renderer {
    textures: Vec<LoadedTexture>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and upload it, returning its handle
    pub fn load_texture(&mut self, path: &Path) -> Result<TextureId, AssetError> {
        let bytes = fs::read(path)?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let texture = Texture2D::from_rgba8(width as u16, height as u16, &rgba.into_raw());
        texture.set_filter(FilterMode::Nearest);
        let id = TextureId(self.textures.len());
        self.textures.push(LoadedTexture {
            texture,
            width,
            height,
        });
        log::debug!("loaded texture {:?} ({}x{}) as {:?}", path, width, height, id);
        Ok(id)
    }

    /// Pixel dimensions of a loaded texture
    pub fn size_of(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id.0).map(|t| (t.width, t.height))
    }

    /// Clear the backbuffer at the start of a frame
    pub fn begin_frame(&self) {
        clear_background(BLACK);
    }
}

impl RenderTarget for Renderer {
    fn render_texture(&mut self, texture: TextureId, src: Rect, dst: Rect, params: DrawParams) {
        let Some(entry) = self.textures.get(texture.0) else {
            log::warn!("draw call with unknown texture {:?}", texture);
            return;
        };
        draw_texture_ex(
            &entry.texture,
            dst.x as f32,
            dst.y as f32,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dst.w as f32, dst.h as f32)),
                source: Some(macroquad::math::Rect::new(
                    src.x as f32,
                    src.y as f32,
                    src.w as f32,
                    src.h as f32,
                )),
                rotation: (params.angle as f32).to_radians(),
                flip_x: params.flip == Flip::Horizontal,
                flip_y: false,
                pivot: Some(vec2(
                    (dst.x + params.rotation_center.x) as f32,
                    (dst.y + params.rotation_center.y) as f32,
                )),
            },
        );
    }
}
