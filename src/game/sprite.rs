//! Sprite-sheet animation state machine
//!
//! A sheet is a fixed grid of equal-size frames plus a table of named
//! clips. Playback accumulates explicit delta time via [`SpriteSheet::advance`],
//! and the current frame is resolved at render time, where a clip past its
//! last frame is marked finished and either wraps (looping) or clamps.

use std::collections::HashMap;

use crate::geometry::{Point, Rect};
use crate::render::{DrawParams, Flip, RenderTarget, TextureId};

/// One named clip: an inclusive frame range inside the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    pub duration_ms: f64,
    pub looped: bool,
    pub flip: Flip,
}

#[derive(Debug, Clone)]
struct ActiveClip {
    name: String,
    anim: Animation,
    elapsed_ms: f64,
    finished: bool,
}

/// A texture sliced into an equal grid of frames with named clips
///
/// At most one clip is active at a time. Objects clone a template sheet at
/// spawn, so each instance owns its playback state.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    texture: TextureId,
    row_count: u32,
    column_count: u32,
    frame_width: u32,
    frame_height: u32,
    frame_center: Point,
    animations: HashMap<String, Animation>,
    active: Option<ActiveClip>,
}

impl SpriteSheet {
    pub fn new(
        texture: TextureId,
        row_count: u32,
        column_count: u32,
        frame_width: u32,
        frame_height: u32,
        frame_center: Point,
    ) -> Self {
        Self {
            texture,
            row_count,
            column_count,
            frame_width,
            frame_height,
            frame_center,
            animations: HashMap::new(),
            active: None,
        }
    }

    /// Register a named clip
    pub fn with_animation(mut self, name: &str, anim: Animation) -> Self {
        if anim.end_row >= self.row_count || anim.end_col >= self.column_count {
            log::warn!(
                "clip '{}' exceeds the {}x{} frame grid",
                name,
                self.row_count,
                self.column_count
            );
        }
        self.animations.insert(name.to_string(), anim);
        self
    }

    /// Switch the active clip
    ///
    /// An empty name clears the clip (static frame). An unknown name is
    /// ignored and the current clip keeps playing.
    pub fn activate_animation(&mut self, name: &str) {
        if name.is_empty() {
            self.active = None;
            return;
        }
        let Some(anim) = self.animations.get(name) else {
            log::warn!("unknown animation '{}'", name);
            return;
        };
        self.active = Some(ActiveClip {
            name: name.to_string(),
            anim: *anim,
            elapsed_ms: 0.0,
            finished: false,
        });
    }

    /// Name of the active clip, if any
    pub fn active_animation(&self) -> Option<&str> {
        self.active.as_ref().map(|c| c.name.as_str())
    }

    /// True once the active clip has passed its last frame (or there is none)
    pub fn animation_finished(&self) -> bool {
        self.active.as_ref().map_or(true, |c| c.finished)
    }

    /// Accumulate playback time on the active clip
    pub fn advance(&mut self, dt_ms: f64) {
        if let Some(clip) = &mut self.active {
            clip.elapsed_ms += dt_ms;
        }
    }

    /// Resolve the cell and flip of the active clip, applying finish/loop
    /// bookkeeping; `None` when no clip (or a degenerate one) drives playback
    fn resolve_frame(&mut self) -> Option<((u32, u32), Flip)> {
        let clip = self.active.as_mut()?;
        let a = clip.anim;
        let total_frames = (a.end_row as i64 - a.start_row as i64) * self.column_count as i64
            + (a.end_col as i64 - a.start_col as i64);
        if total_frames <= 0 || a.duration_ms <= 0.0 || self.column_count == 0 {
            return None;
        }
        let frame_duration = a.duration_ms / total_frames as f64;
        let mut frame = (clip.elapsed_ms / frame_duration) as i64;
        if frame > total_frames {
            clip.finished = true;
            if a.looped {
                clip.elapsed_ms = 0.0;
                frame = 0;
            } else {
                frame = total_frames;
            }
        }
        let row = a.start_row as i64 + frame / self.column_count as i64;
        let col = a.start_col as i64 + frame % self.column_count as i64;
        Some(((row as u32, col as u32), a.flip))
    }

    /// Grid cell to draw, falling back to the static frame (0, 0)
    #[cfg(test)]
    fn current_cell(&mut self) -> (u32, u32) {
        self.resolve_frame().map_or((0, 0), |(cell, _)| cell)
    }

    /// Draw the current frame anchored at `dest` (screen space) by the
    /// frame-center offset
    pub fn render(
        &mut self,
        target: &mut dyn RenderTarget,
        dest: Point,
        angle: f64,
        rotation_center: Point,
    ) {
        let ((row, col), flip) = self.resolve_frame().unwrap_or(((0, 0), Flip::None));
        let src = Rect::new(
            (col * self.frame_width) as i32,
            (row * self.frame_height) as i32,
            self.frame_width as i32,
            self.frame_height as i32,
        );
        let dst = Rect::new(
            dest.x - self.frame_center.x,
            dest.y - self.frame_center.y,
            self.frame_width as i32,
            self.frame_height as i32,
        );
        target.render_texture(
            self.texture,
            src,
            dst,
            DrawParams {
                flip,
                angle,
                rotation_center,
            },
        );
    }
}
