//! Frame orchestrator
//!
//! Owns the level, tile textures, camera, player, object collection and id
//! allocator. Each tick runs in a fixed order: pointer/directional input,
//! object updates, cull, camera look-at; rendering walks terrain layers
//! bottom to top, then objects in insertion order, then the player.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::game::enemy::{self, Enemy};
use crate::game::player::{self, Player};
use crate::game::sprite::SpriteSheet;
use crate::game::temporary::{self, TemporaryObject};
use crate::game::{GameCamera, GameObject, IdAllocator};
use crate::geometry::{Point, Rect};
use crate::input::FrameInput;
use crate::render::{DrawParams, RenderTarget, Renderer, TextureId};
use crate::world::tiled::{self, LoadedLevel};
use crate::world::Level;

/// Seconds an explosion stays alive
const BOMB_TTL_SECS: f64 = 2.1;

const PLAYER_SHEET: &str = "assets/sprites/player.png";
const ENEMY_SHEET: &str = "assets/sprites/enemy.png";
const BOMB_SHEET: &str = "assets/sprites/bomb.png";

/// A tile's texture with the source image dimensions from its tileset
#[derive(Debug, Clone, Copy)]
pub(crate) struct TileTexture {
    texture: TextureId,
    width: u32,
    height: u32,
}

pub struct Engine {
    level: Level,
    tile_textures: HashMap<u32, TileTexture>,
    camera: GameCamera,
    player: Player,
    objects: Vec<GameObject>,
    ids: IdAllocator,
    enemy_sheet: SpriteSheet,
    bomb_sheet: SpriteSheet,
    clock_secs: f64,
}

impl Engine {
    /// Load the configured level, tile textures and sprite sheets, then
    /// assemble the world with the configured spawns
    pub fn new(config: &Config, renderer: &mut Renderer) -> anyhow::Result<Self> {
        let loaded = tiled::load_level(&config.level)
            .with_context(|| format!("loading level {:?}", config.level))?;
        let tile_textures = load_tile_textures(&loaded, renderer)?;

        let player_sheet = player::sprite_sheet(load_sheet_texture(renderer, PLAYER_SHEET)?);
        let enemy_sheet = enemy::sprite_sheet(load_sheet_texture(renderer, ENEMY_SHEET)?);
        let bomb_sheet = temporary::bomb_sprite_sheet(load_sheet_texture(renderer, BOMB_SHEET)?);

        let mut engine = Self::assemble(
            loaded.level,
            tile_textures,
            config.window.width,
            config.window.height,
            player_sheet,
            enemy_sheet,
            bomb_sheet,
            config.player_spawn,
        );
        for spawn in &config.enemy_spawns {
            engine.add_enemy(*spawn);
        }
        Ok(engine)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        level: Level,
        tile_textures: HashMap<u32, TileTexture>,
        viewport_w: i32,
        viewport_h: i32,
        player_sheet: SpriteSheet,
        enemy_sheet: SpriteSheet,
        bomb_sheet: SpriteSheet,
        player_spawn: Point,
    ) -> Self {
        let mut camera = GameCamera::new(viewport_w, viewport_h);
        camera.set_world_bounds(level.pixel_bounds());
        let mut ids = IdAllocator::new();
        let player = Player::new(ids.allocate(), player_sheet, player_spawn);
        Self {
            level,
            tile_textures,
            camera,
            player,
            objects: Vec::new(),
            ids,
            enemy_sheet,
            bomb_sheet,
            clock_secs: 0.0,
        }
    }

    /// Current player position in world coordinates
    pub fn player_position(&self) -> Point {
        self.player.position()
    }

    /// Accumulated game time in seconds
    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    /// Spawn an explosion; `translate` maps viewport coordinates to world
    pub fn add_bomb(&mut self, x: i32, y: i32, translate: bool) {
        let world = if translate {
            self.camera.to_world(Point::new(x, y))
        } else {
            Point::new(x, y)
        };
        let mut sheet = self.bomb_sheet.clone();
        sheet.activate_animation("Explode");
        let bomb = TemporaryObject::new(self.ids.allocate(), sheet, world, BOMB_TTL_SECS);
        self.objects.push(GameObject::Temporary(bomb));
    }

    /// Spawn a chasing enemy at a world position
    pub fn add_enemy(&mut self, position: Point) {
        let enemy = Enemy::new(self.ids.allocate(), self.enemy_sheet.clone(), position);
        self.objects.push(GameObject::Enemy(enemy));
    }

    /// Run one update tick
    pub fn process_frame(&mut self, input: &FrameInput, dt_ms: f64) {
        self.clock_secs += dt_ms / 1000.0;

        for click in &input.clicks {
            self.add_bomb(click.x, click.y, true);
        }

        self.player
            .update_position(input.up, input.down, input.left, input.right, dt_ms);
        self.player.body.animate(dt_ms);

        let player = &mut self.player;
        self.objects.retain_mut(|obj| obj.update(player, dt_ms));

        self.camera.look_at(self.player.position());
    }

    /// Draw the frame: terrain layers bottom to top, objects in insertion
    /// order, player last
    pub fn render_frame(&mut self, target: &mut dyn RenderTarget) {
        self.render_terrain(target);
        for obj in &mut self.objects {
            obj.render(&self.camera, target);
        }
        self.player.body.render(&self.camera, target);
    }

    fn render_terrain(&self, target: &mut dyn RenderTarget) {
        let tile_w = self.level.tile_width as i32;
        let tile_h = self.level.tile_height as i32;
        for layer in &self.level.layers {
            for j in 0..layer.height {
                for i in 0..layer.width {
                    let Some(gid) = layer.gid_at(i, j) else {
                        continue;
                    };
                    if gid == 0 {
                        continue;
                    }
                    let Some(tile) = self.tile_textures.get(&(gid - 1)) else {
                        continue;
                    };
                    let dst = self.camera.to_screen(Rect::new(
                        i as i32 * tile_w,
                        j as i32 * tile_h,
                        tile_w,
                        tile_h,
                    ));
                    let src = Rect::new(0, 0, tile.width as i32, tile.height as i32);
                    target.render_texture(tile.texture, src, dst, DrawParams::default());
                }
            }
        }
    }
}

fn load_sheet_texture(renderer: &mut Renderer, path: &str) -> anyhow::Result<TextureId> {
    renderer
        .load_texture(Path::new(path))
        .with_context(|| format!("loading sprite sheet {:?}", path))
}

/// Decode every tile image referenced by the level's tilesets
///
/// The map is keyed by `firstgid - 1 + tile id`, matching the render-time
/// `gid - 1` lookup.
fn load_tile_textures(
    loaded: &LoadedLevel,
    renderer: &mut Renderer,
) -> anyhow::Result<HashMap<u32, TileTexture>> {
    let mut map = HashMap::new();
    for set in &loaded.tile_sets {
        for tile in &set.tile_set.tiles {
            let path = set.base_dir.join(&tile.image);
            let texture = renderer
                .load_texture(&path)
                .with_context(|| format!("loading tile image {:?}", path))?;
            if let Some((w, h)) = renderer.size_of(texture) {
                if w != tile.image_width || h != tile.image_height {
                    log::warn!(
                        "tile {} image {:?} is {}x{}, tileset declares {}x{}",
                        tile.id,
                        path,
                        w,
                        h,
                        tile.image_width,
                        tile.image_height
                    );
                }
            }
            map.insert(
                set.first_gid - 1 + tile.id,
                TileTexture {
                    texture,
                    width: tile.image_width,
                    height: tile.image_height,
                },
            );
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingTarget;
    use crate::world::Layer;

    const PLAYER_TEX: TextureId = TextureId(0);
    const ENEMY_TEX: TextureId = TextureId(1);
    const BOMB_TEX: TextureId = TextureId(2);

    fn grid_engine(width: u32, height: u32, data: Vec<u32>) -> Engine {
        let level = Level {
            width,
            height,
            tile_width: 16,
            tile_height: 16,
            layers: vec![Layer {
                name: "ground".to_string(),
                width,
                height,
                data,
            }],
            tile_set_refs: Vec::new(),
        };
        let mut tile_textures = HashMap::new();
        tile_textures.insert(
            0,
            TileTexture {
                texture: TextureId(10),
                width: 16,
                height: 16,
            },
        );
        tile_textures.insert(
            1,
            TileTexture {
                texture: TextureId(11),
                width: 16,
                height: 16,
            },
        );
        Engine::assemble(
            level,
            tile_textures,
            800,
            480,
            player::sprite_sheet(PLAYER_TEX),
            enemy::sprite_sheet(ENEMY_TEX),
            temporary::bomb_sprite_sheet(BOMB_TEX),
            Point::new(16, 16),
        )
    }

    fn small_engine() -> Engine {
        grid_engine(2, 2, vec![1, 0, 0, 2])
    }

    #[test]
    fn test_terrain_draws_only_occupied_cells() {
        let mut engine = small_engine();
        let mut target = RecordingTarget::default();
        engine.render_frame(&mut target);

        let terrain: Vec<_> = target
            .calls
            .iter()
            .filter(|c| c.texture == TextureId(10) || c.texture == TextureId(11))
            .collect();
        assert_eq!(terrain.len(), 2);

        assert_eq!(terrain[0].texture, TextureId(10));
        let origin = Point::new(terrain[0].dst.x, terrain[0].dst.y);
        assert_eq!(engine.camera.to_world(origin), Point::new(0, 0));
        assert_eq!((terrain[0].dst.w, terrain[0].dst.h), (16, 16));

        assert_eq!(terrain[1].texture, TextureId(11));
        let origin = Point::new(terrain[1].dst.x, terrain[1].dst.y);
        assert_eq!(engine.camera.to_world(origin), Point::new(16, 16));
        assert_eq!((terrain[1].dst.w, terrain[1].dst.h), (16, 16));
    }

    #[test]
    fn test_unmapped_gid_is_skipped() {
        let mut engine = grid_engine(2, 2, vec![9, 0, 0, 0]);
        let mut target = RecordingTarget::default();
        engine.render_frame(&mut target);
        // Only the player draw remains
        assert_eq!(target.calls.len(), 1);
        assert_eq!(target.calls[0].texture, PLAYER_TEX);
    }

    #[test]
    fn test_render_order_is_terrain_objects_player() {
        let mut engine = small_engine();
        engine.add_enemy(Point::new(100, 100));
        engine.add_bomb(200, 200, false);
        let mut target = RecordingTarget::default();
        engine.render_frame(&mut target);

        assert_eq!(target.calls.len(), 5);
        assert_eq!(target.calls[2].texture, ENEMY_TEX);
        assert_eq!(target.calls[3].texture, BOMB_TEX);
        assert_eq!(target.calls[4].texture, PLAYER_TEX);
    }

    #[test]
    fn test_click_spawns_bomb_at_world_position() {
        let mut engine = small_engine();
        let input = FrameInput {
            clicks: vec![Point::new(400, 240)],
            ..Default::default()
        };
        engine.process_frame(&input, 16.0);

        assert_eq!(engine.objects.len(), 1);
        let GameObject::Temporary(bomb) = &engine.objects[0] else {
            panic!("expected a bomb");
        };
        // The viewport center maps back to the camera position
        assert_eq!(bomb.body.position, engine.camera.position());
    }

    #[test]
    fn test_add_bomb_translate_flag() {
        let mut engine = small_engine();
        engine.add_bomb(5, 7, false);
        let GameObject::Temporary(bomb) = &engine.objects[0] else {
            panic!("expected a bomb");
        };
        assert_eq!(bomb.body.position, Point::new(5, 7));

        engine.add_bomb(400, 240, true);
        let GameObject::Temporary(bomb) = &engine.objects[1] else {
            panic!("expected a bomb");
        };
        assert_eq!(bomb.body.position, engine.camera.position());
    }

    #[test]
    fn test_expired_bomb_is_culled() {
        let mut engine = small_engine();
        engine.add_bomb(10, 10, false);
        assert_eq!(engine.objects.len(), 1);
        engine.process_frame(&FrameInput::default(), 2100.0);
        assert!(engine.objects.is_empty());
    }

    #[test]
    fn test_enemy_hit_damages_player_and_is_culled() {
        let mut engine = small_engine();
        let enemy = Enemy::with_speed(
            engine.ids.allocate(),
            engine.enemy_sheet.clone(),
            engine.player.position(),
            50.0,
        );
        engine.objects.push(GameObject::Enemy(enemy));

        engine.process_frame(&FrameInput::default(), 1000.0);
        assert_eq!(engine.player.health(), 80);
        assert!(engine.objects.is_empty());
    }

    #[test]
    fn test_camera_follows_player_within_bounds() {
        // 100x100 tiles of 16 px: big enough for real margins
        let mut engine = grid_engine(100, 100, vec![0; 100 * 100]);
        engine.player.body.position = Point::new(800, 700);
        engine.process_frame(&FrameInput::default(), 16.0);
        assert_eq!(engine.camera.position(), Point::new(800, 700));

        // Off-bounds target: the X axis stops tracking, Y keeps its value
        engine.player.body.position = Point::new(-5000, 700);
        engine.process_frame(&FrameInput::default(), 16.0);
        assert_eq!(engine.camera.position(), Point::new(800, 700));
    }

    #[test]
    fn test_ids_stay_unique_across_spawns() {
        let mut engine = small_engine();
        engine.add_enemy(Point::new(50, 50));
        engine.add_bomb(60, 60, false);
        let a = engine.objects[0].id();
        let b = engine.objects[1].id();
        assert_ne!(a, b);
        assert_ne!(a, engine.player.body.id());
        assert_ne!(b, engine.player.body.id());
    }

    #[test]
    fn test_clock_accumulates() {
        let mut engine = small_engine();
        engine.process_frame(&FrameInput::default(), 500.0);
        engine.process_frame(&FrameInput::default(), 500.0);
        assert!((engine.clock_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_directional_input_moves_player() {
        let mut engine = grid_engine(100, 100, vec![0; 100 * 100]);
        let start = engine.player_position();
        let input = FrameInput {
            right: true,
            ..Default::default()
        };
        engine.process_frame(&input, 1000.0);
        assert_eq!(engine.player_position(), Point::new(start.x + 128, start.y));
    }
}
