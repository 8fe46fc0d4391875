//! Short-lived objects culled after a fixed time-to-live

use crate::game::object::{ObjectId, RenderableObject};
use crate::game::sprite::{Animation, SpriteSheet};
use crate::geometry::Point;
use crate::render::{Flip, TextureId};

/// An object that ages every frame and reports expiry once its
/// time-to-live has fully elapsed. Expiry is derived from age, not stored.
#[derive(Debug, Clone)]
pub struct TemporaryObject {
    pub body: RenderableObject,
    ttl_secs: f64,
    age_secs: f64,
}

impl TemporaryObject {
    pub fn new(id: ObjectId, sheet: SpriteSheet, position: Point, ttl_secs: f64) -> Self {
        Self {
            body: RenderableObject::new(id, sheet, position),
            ttl_secs,
            age_secs: 0.0,
        }
    }

    /// Age by the frame's delta time and advance the sprite clip
    pub fn update(&mut self, dt_ms: f64) {
        self.age_secs += dt_ms / 1000.0;
        self.body.animate(dt_ms);
    }

    /// True once the full time-to-live has elapsed, boundary inclusive
    pub fn is_expired(&self) -> bool {
        self.age_secs >= self.ttl_secs
    }
}

/// Clip table for the bomb sheet: a 2x5 grid of 32x32 explosion frames
pub fn bomb_sprite_sheet(texture: TextureId) -> SpriteSheet {
    SpriteSheet::new(texture, 2, 5, 32, 32, Point::new(16, 16)).with_animation(
        "Explode",
        Animation {
            start_row: 0,
            start_col: 0,
            end_row: 1,
            end_col: 4,
            duration_ms: 2000.0,
            looped: false,
            flip: Flip::None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::object::IdAllocator;

    fn bomb(ttl_secs: f64) -> TemporaryObject {
        let mut ids = IdAllocator::new();
        TemporaryObject::new(
            ids.allocate(),
            bomb_sprite_sheet(TextureId(0)),
            Point::new(10, 10),
            ttl_secs,
        )
    }

    #[test]
    fn test_fresh_object_is_not_expired() {
        assert!(!bomb(2.0).is_expired());
    }

    #[test]
    fn test_not_expired_before_ttl() {
        let mut b = bomb(2.0);
        b.update(1000.0);
        assert!(!b.is_expired());
    }

    #[test]
    fn test_expired_at_exact_ttl() {
        let mut b = bomb(2.0);
        b.update(1000.0);
        b.update(1000.0);
        assert!(b.is_expired());
    }
}
