//! Game objects, camera and sprite animation
//!
//! Plain-data object structs with explicit update methods, driven by the
//! orchestrator in `crate::engine`. Non-player kinds live in the closed
//! [`object::GameObject`] set; the player is a standalone struct.

pub mod camera;
pub mod enemy;
pub mod object;
pub mod player;
pub mod sprite;
pub mod temporary;

pub use camera::GameCamera;
pub use object::{GameObject, IdAllocator};
