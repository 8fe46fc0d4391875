//! TILEQUEST: a top-down tile game runtime
//!
//! A small engine for Tiled-style maps and sprite-sheet characters:
//! - Arrow/WASD movement with a camera that tracks the player
//! - Chasing enemies and click-to-drop explosions
//! - Rhai behavior scripts, hot reloaded from disk

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod engine;
mod game;
mod geometry;
mod input;
mod render;
mod scripting;
mod world;

use std::path::Path;

use macroquad::prelude::{get_frame_time, next_frame, prevent_quit, Conf};

use config::{Config, CONFIG_PATH};
use engine::Engine;
use input::FrameInput;
use render::Renderer;
use scripting::ScriptHost;

fn window_conf() -> Conf {
    // The logger is not up yet, so a broken config falls back silently
    // here; main reloads it and reports the error.
    let config = Config::load_or_default(Path::new(CONFIG_PATH));
    Conf {
        window_title: format!("{} v{}", config.window.title, VERSION),
        window_width: config.window.width,
        window_height: config.window.height,
        window_resizable: false,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("cannot load {}: {}", CONFIG_PATH, e);
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    let mut engine = match Engine::new(&config, &mut renderer) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("startup failed: {:#}", e);
            std::process::exit(1);
        }
    };
    let mut scripts = ScriptHost::new(&config.scripts);

    // Route quit through FrameInput so the window button is observed too
    prevent_quit();
    log::info!("{} v{} ready", config.window.title, VERSION);

    loop {
        let input = FrameInput::poll();
        if input.quit {
            break;
        }

        let dt_ms = get_frame_time() as f64 * 1000.0;
        engine.process_frame(&input, dt_ms);
        scripts.run_frame(&mut engine);

        renderer.begin_frame();
        engine.render_frame(&mut renderer);
        next_frame().await;
    }
}
