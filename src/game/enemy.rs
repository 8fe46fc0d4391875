//! Chasing enemy with a cooldown melee attack

use rand::Rng;

use crate::game::object::{ObjectId, RenderableObject};
use crate::game::player::Player;
use crate::game::sprite::{Animation, SpriteSheet};
use crate::geometry::Point;
use crate::render::{Flip, TextureId};

/// Damage dealt per landed hit
const DAMAGE: i32 = 20;
/// Seconds that must pass between attacks
const ATTACK_COOLDOWN_SECS: f64 = 1.0;
/// Attack range in pixels
const ATTACK_RANGE: f64 = 32.0;

/// An enemy steers toward the player every frame and lands a single hit
/// once in range with its cooldown elapsed, after which it is removed.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: RenderableObject,
    speed: f64,
    cooldown_secs: f64,
    should_remove: bool,
}

impl Enemy {
    pub fn new(id: ObjectId, sheet: SpriteSheet, position: Point) -> Self {
        let speed = rand::thread_rng().gen_range(40..80) as f64;
        Self::with_speed(id, sheet, position, speed)
    }

    /// Fixed-speed constructor, lets tests make movement deterministic
    pub(crate) fn with_speed(id: ObjectId, sheet: SpriteSheet, position: Point, speed: f64) -> Self {
        let mut body = RenderableObject::new(id, sheet, position);
        body.sheet.activate_animation("Walk");
        Self {
            body,
            speed,
            cooldown_secs: 0.0,
            should_remove: false,
        }
    }

    /// Set once this enemy has landed its hit; the orchestrator culls it
    pub fn should_remove(&self) -> bool {
        self.should_remove
    }

    /// Steer toward the player, then attack if in range off cooldown
    pub fn update(&mut self, player: &mut Player, dt_ms: f64) {
        self.cooldown_secs += dt_ms / 1000.0;
        self.body.animate(dt_ms);

        let target = player.position();
        let dx = (target.x - self.body.position.x) as f64;
        let dy = (target.y - self.body.position.y) as f64;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > 0.0 {
            let step = self.speed * dt_ms / 1000.0;
            let nx = self.body.position.x as f64 + dx / distance * step;
            let ny = self.body.position.y as f64 + dy / distance * step;
            self.body.position = Point::new(nx as i32, ny as i32);
        }

        let dx = (target.x - self.body.position.x) as f64;
        let dy = (target.y - self.body.position.y) as f64;
        if (dx * dx + dy * dy).sqrt() < ATTACK_RANGE && self.cooldown_secs >= ATTACK_COOLDOWN_SECS {
            player.take_damage(DAMAGE);
            self.should_remove = true;
            self.cooldown_secs = 0.0;
        }
    }
}

/// Clip table for the enemy sheet: one row of four 32x32 frames
pub fn sprite_sheet(texture: TextureId) -> SpriteSheet {
    SpriteSheet::new(texture, 1, 4, 32, 32, Point::new(16, 16)).with_animation(
        "Walk",
        Animation {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 3,
            duration_ms: 500.0,
            looped: true,
            flip: Flip::None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::object::IdAllocator;
    use crate::game::player;

    fn setup(enemy_pos: Point, speed: f64) -> (Player, Enemy) {
        let mut ids = IdAllocator::new();
        let player = Player::new(
            ids.allocate(),
            player::sprite_sheet(TextureId(0)),
            Point::new(100, 0),
        );
        let enemy = Enemy::with_speed(ids.allocate(), sprite_sheet(TextureId(1)), enemy_pos, speed);
        (player, enemy)
    }

    #[test]
    fn test_speed_is_randomized_in_range() {
        let mut ids = IdAllocator::new();
        for _ in 0..20 {
            let enemy = Enemy::new(ids.allocate(), sprite_sheet(TextureId(0)), Point::default());
            assert!((40.0..80.0).contains(&enemy.speed));
        }
    }

    #[test]
    fn test_walk_clip_starts_at_construction() {
        let (_, enemy) = setup(Point::default(), 64.0);
        assert_eq!(enemy.body.sheet.active_animation(), Some("Walk"));
    }

    #[test]
    fn test_steers_toward_player() {
        let (mut player, mut enemy) = setup(Point::new(0, 0), 64.0);
        enemy.update(&mut player, 1000.0);
        assert_eq!(enemy.body.position, Point::new(64, 0));
        // Still 36 px away: no hit yet
        assert_eq!(player.health(), 100);
        assert!(!enemy.should_remove());
    }

    #[test]
    fn test_attacks_once_in_range() {
        let (mut player, mut enemy) = setup(Point::new(0, 0), 64.0);
        enemy.update(&mut player, 1000.0);
        enemy.update(&mut player, 1000.0);
        assert_eq!(player.health(), 80);
        assert!(enemy.should_remove());
        // Cooldown was reset: an immediate extra tick cannot hit again
        enemy.update(&mut player, 16.0);
        assert_eq!(player.health(), 80);
    }

    #[test]
    fn test_cooldown_gates_the_attack() {
        let (mut player, mut enemy) = setup(Point::new(90, 0), 64.0);
        enemy.update(&mut player, 400.0);
        // In range but only 0.4 s accumulated
        assert_eq!(player.health(), 100);
        assert!(!enemy.should_remove());
    }

    #[test]
    fn test_zero_distance_skips_steering_but_not_attack() {
        let (mut player, mut enemy) = setup(Point::new(100, 0), 64.0);
        enemy.update(&mut player, 1000.0);
        assert_eq!(enemy.body.position, Point::new(100, 0));
        assert_eq!(player.health(), 80);
    }
}
