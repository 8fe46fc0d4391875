//! Object identity and the shared renderable body
//!
//! Every live object owns a monotonically-allocated id, a world position
//! and a sprite sheet. The non-player kinds form a closed set of variants
//! dispatched by match; the player is held separately by the orchestrator.

use crate::game::camera::GameCamera;
use crate::game::enemy::Enemy;
use crate::game::player::Player;
use crate::game::sprite::SpriteSheet;
use crate::game::temporary::TemporaryObject;
use crate::geometry::Point;
use crate::render::RenderTarget;

/// A unique identifier for a game object, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Hands out object ids, owned by the orchestrator
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id, monotonically
    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }
}

/// Identity, placement and sprite shared by every object kind
#[derive(Debug, Clone)]
pub struct RenderableObject {
    id: ObjectId,
    pub position: Point,
    pub sheet: SpriteSheet,
    pub angle: f64,
    pub rotation_center: Point,
}

impl RenderableObject {
    pub fn new(id: ObjectId, sheet: SpriteSheet, position: Point) -> Self {
        Self {
            id,
            position,
            sheet,
            angle: 0.0,
            rotation_center: Point::default(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Advance the active sprite clip by the frame's delta time
    pub fn animate(&mut self, dt_ms: f64) {
        self.sheet.advance(dt_ms);
    }

    /// Draw at the camera-transformed position
    pub fn render(&mut self, camera: &GameCamera, target: &mut dyn RenderTarget) {
        let dest = camera.to_screen_point(self.position);
        self.sheet.render(target, dest, self.angle, self.rotation_center);
    }
}

/// The closed set of non-player object kinds
#[derive(Debug, Clone)]
pub enum GameObject {
    Enemy(Enemy),
    Temporary(TemporaryObject),
}

impl GameObject {
    pub fn id(&self) -> ObjectId {
        match self {
            GameObject::Enemy(e) => e.body.id(),
            GameObject::Temporary(t) => t.body.id(),
        }
    }

    /// Run one update tick; false means the object should be culled
    pub fn update(&mut self, player: &mut Player, dt_ms: f64) -> bool {
        match self {
            GameObject::Enemy(e) => {
                e.update(player, dt_ms);
                !e.should_remove()
            }
            GameObject::Temporary(t) => {
                t.update(dt_ms);
                !t.is_expired()
            }
        }
    }

    pub fn render(&mut self, camera: &GameCamera, target: &mut dyn RenderTarget) {
        match self {
            GameObject::Enemy(e) => e.body.render(camera, target),
            GameObject::Temporary(t) => t.body.render(camera, target),
        }
    }
}
