//! Clamped look-at camera and world/screen coordinate conversion

use crate::geometry::{Point, Rect};

/// Margin used when the level is smaller than one viewport on an axis
const MIN_MARGIN: i32 = 48;

/// Camera centered on a world position, clamped to the level bounds
///
/// The viewport size is fixed at construction; `look_at` keeps the center
/// inside the margin-shrunk world bounds so the view never shows past the
/// level edge on axes where the level is large enough.
#[derive(Debug, Clone)]
pub struct GameCamera {
    x: i32,
    y: i32,
    world_bounds: Rect,
    width: i32,
    height: i32,
}

impl GameCamera {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            world_bounds: Rect::default(),
            width,
            height,
        }
    }

    /// Current center in world coordinates
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Restrict camera travel to `bounds` shrunk by half a viewport per axis
    /// and snap to the top-left corner of the restricted area
    pub fn set_world_bounds(&mut self, bounds: Rect) {
        let mut margin_left = self.width / 2;
        let mut margin_top = self.height / 2;
        if margin_left * 2 > bounds.w {
            margin_left = MIN_MARGIN;
        }
        if margin_top * 2 > bounds.h {
            margin_top = MIN_MARGIN;
        }
        self.world_bounds = Rect::new(
            margin_left,
            margin_top,
            bounds.w - margin_left * 2,
            bounds.h - margin_top * 2,
        );
        self.x = margin_left;
        self.y = margin_top;
    }

    /// Track a world position, clamping each axis independently
    pub fn look_at(&mut self, target: Point) {
        if self.world_bounds.contains(Point::new(self.x, target.y)) {
            self.y = target.y;
        }
        if self.world_bounds.contains(Point::new(target.x, self.y)) {
            self.x = target.x;
        }
    }

    /// World rectangle to screen coordinates
    pub fn to_screen(&self, rect: Rect) -> Rect {
        rect.translated(self.width / 2 - self.x, self.height / 2 - self.y)
    }

    /// World point to screen coordinates
    pub fn to_screen_point(&self, point: Point) -> Point {
        point.translated(self.width / 2 - self.x, self.height / 2 - self.y)
    }

    /// Screen point back to world coordinates
    pub fn to_world(&self, point: Point) -> Point {
        point.translated(self.x - self.width / 2, self.y - self.height / 2)
    }
}
