//! Player movement integration and animation selection

use crate::game::object::{ObjectId, RenderableObject};
use crate::game::sprite::{Animation, SpriteSheet};
use crate::geometry::Point;
use crate::render::{Flip, TextureId};

/// Movement speed in pixels per second
const SPEED: i32 = 128;
/// Starting health
const MAX_HEALTH: i32 = 100;

pub struct Player {
    pub body: RenderableObject,
    health: i32,
}

impl Player {
    pub fn new(id: ObjectId, sheet: SpriteSheet, position: Point) -> Self {
        let mut body = RenderableObject::new(id, sheet, position);
        body.sheet.activate_animation("IdleDown");
        Self {
            body,
            health: MAX_HEALTH,
        }
    }

    pub fn position(&self) -> Point {
        self.body.position
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Reduce health, clamping at zero
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
        log::info!("player hit for {}, health {}", amount, self.health);
    }

    /// Integrate held directional flags over the frame's delta time, then
    /// pick the clip matching the resulting movement delta
    ///
    /// With no flag held this is a no-op: position and the current clip are
    /// left untouched. Each axis contribution truncates toward zero.
    pub fn update_position(&mut self, up: bool, down: bool, left: bool, right: bool, dt_ms: f64) {
        if !up && !down && !left && !right {
            return;
        }
        let pixels = SPEED as f64 * dt_ms / 1000.0;
        let prev = self.body.position;
        let mut x = prev.x;
        let mut y = prev.y;
        if right {
            x += pixels as i32;
        }
        if left {
            x -= pixels as i32;
        }
        if down {
            y += pixels as i32;
        }
        if up {
            y -= pixels as i32;
        }
        self.body.position = Point::new(x, y);

        let next = if y < prev.y {
            "MoveUp"
        } else if y > prev.y {
            "MoveDown"
        } else if x < prev.x {
            "MoveLeft"
        } else if x > prev.x {
            "MoveRight"
        } else {
            "IdleDown"
        };
        if self.body.sheet.active_animation() != Some(next) {
            self.body.sheet.activate_animation(next);
        }
    }
}

/// Clip table for the player sheet: five rows of six 48x48 frames,
/// one row per movement clip, anchored at the feet
pub fn sprite_sheet(texture: TextureId) -> SpriteSheet {
    let row_clip = |row: u32, duration_ms: f64| Animation {
        start_row: row,
        start_col: 0,
        end_row: row,
        end_col: 5,
        duration_ms,
        looped: true,
        flip: Flip::None,
    };
    SpriteSheet::new(texture, 5, 6, 48, 48, Point::new(24, 42))
        .with_animation("IdleDown", row_clip(0, 1000.0))
        .with_animation("MoveDown", row_clip(1, 600.0))
        .with_animation("MoveUp", row_clip(2, 600.0))
        .with_animation("MoveLeft", row_clip(3, 600.0))
        .with_animation("MoveRight", row_clip(4, 600.0))
}
