//! Input state management
//!
//! Polls macroquad keyboard/mouse state once per frame into a plain
//! snapshot the orchestrator consumes. Arrows and WASD both drive the
//! directional flags; pointer presses are discrete per-frame events.

use macroquad::prelude::{
    is_key_down, is_mouse_button_pressed, is_quit_requested, mouse_position, KeyCode, MouseButton,
};

use crate::geometry::Point;

/// Directional flags and discrete events gathered once per frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub quit: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Left-button presses this frame, in viewport coordinates
    pub clicks: Vec<Point>,
}

impl FrameInput {
    /// Call once per frame, before the update pass
    pub fn poll() -> Self {
        let mut clicks = Vec::new();
        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            clicks.push(Point::new(x as i32, y as i32));
        }
        Self {
            quit: is_quit_requested(),
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            clicks,
        }
    }
}
