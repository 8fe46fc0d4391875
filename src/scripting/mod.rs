//! Behavior scripting with hot reload
//!
//! Each `.rhai` file in the scripts directory is one unit defining
//! `fn update(state, game)` and optionally `fn init(game)`. Units run once
//! per frame against a [`GameHandle`] snapshot that collects spawn
//! commands, so scripts never hold a borrow of the engine. A filesystem
//! watcher reports changes over an mpsc channel; the main thread drains it
//! between frames and swaps recompiled units, keeping the previous version
//! when a reload fails.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rand::Rng;
use rhai::{Dynamic, Scope, AST};
use thiserror::Error;

use crate::engine::Engine;

/// Errors raised while compiling a unit
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("parse error: {0}")]
    Parse(#[from] rhai::ParseError),
    #[error("script defines no update function")]
    MissingUpdate,
}

/// Commands a unit may issue during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptCommand {
    AddBomb { x: i32, y: i32, translate: bool },
}

/// Snapshot of the engine passed to script functions
///
/// Registered with rhai as `Game`. Commands accumulate in a shared buffer
/// and are applied to the engine after every unit has run.
#[derive(Debug, Clone)]
struct GameHandle {
    player_x: i64,
    player_y: i64,
    time_secs: f64,
    commands: Rc<RefCell<Vec<ScriptCommand>>>,
}

fn build_engine() -> rhai::Engine {
    let mut engine = rhai::Engine::new();
    engine.register_type_with_name::<GameHandle>("Game");
    engine.register_fn("player_x", |game: &mut GameHandle| game.player_x);
    engine.register_fn("player_y", |game: &mut GameHandle| game.player_y);
    engine.register_fn("time", |game: &mut GameHandle| game.time_secs);
    engine.register_fn(
        "add_bomb",
        |game: &mut GameHandle, x: i64, y: i64, translate: bool| {
            game.commands.borrow_mut().push(ScriptCommand::AddBomb {
                x: x as i32,
                y: y as i32,
                translate,
            });
        },
    );
    engine.register_fn("rand_range", |lo: i64, hi: i64| {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        rand::thread_rng().gen_range(lo..=hi)
    });
    engine.register_fn("rand_range", |lo: f64, hi: f64| {
        if lo < hi {
            rand::thread_rng().gen_range(lo..hi)
        } else {
            lo
        }
    });
    engine
}

/// One compiled behavior unit with its persistent state
#[derive(Debug)]
struct ScriptUnit {
    name: String,
    ast: AST,
    state: Dynamic,
    initialized: bool,
}

impl ScriptUnit {
    fn compile(engine: &rhai::Engine, name: &str, source: &str) -> Result<Self, ScriptError> {
        let ast = engine.compile(source)?;
        if !ast.iter_functions().any(|f| f.name == "update") {
            return Err(ScriptError::MissingUpdate);
        }
        Ok(Self {
            name: name.to_string(),
            ast,
            state: Dynamic::UNIT,
            initialized: false,
        })
    }

    /// Run `init` on first use, then `update`; the state returned by
    /// `update` replaces the stored one. Runtime errors keep the old state.
    fn run(&mut self, engine: &rhai::Engine, game: GameHandle) {
        if !self.initialized {
            self.initialized = true;
            if self.ast.iter_functions().any(|f| f.name == "init") {
                match engine.call_fn::<Dynamic>(&mut Scope::new(), &self.ast, "init", (game.clone(),))
                {
                    Ok(state) => self.state = state,
                    Err(e) => log::warn!("script '{}' init failed: {}", self.name, e),
                }
            }
        }
        match engine.call_fn::<Dynamic>(
            &mut Scope::new(),
            &self.ast,
            "update",
            (self.state.clone(), game),
        ) {
            Ok(next) => self.state = next,
            Err(e) => log::warn!("script '{}' update failed: {}", self.name, e),
        }
    }
}

/// Loads, watches and drives the behavior units of a directory
pub struct ScriptHost {
    engine: rhai::Engine,
    units: BTreeMap<PathBuf, ScriptUnit>,
    events: Option<Receiver<notify::Result<notify::Event>>>,
    _watcher: Option<RecommendedWatcher>,
    dir: PathBuf,
}

impl ScriptHost {
    /// Load every `.rhai` unit under `dir` and start watching for changes
    ///
    /// A missing directory or unavailable watcher disables scripting or hot
    /// reload respectively; neither is fatal.
    pub fn new(dir: &Path) -> Self {
        let mut host = Self {
            engine: build_engine(),
            units: BTreeMap::new(),
            events: None,
            _watcher: None,
            dir: dir.to_path_buf(),
        };
        if !dir.is_dir() {
            log::info!("no script directory at {:?}", dir);
            return host;
        }
        host.load_all();
        match watch(dir) {
            Ok((watcher, events)) => {
                host._watcher = Some(watcher);
                host.events = Some(events);
            }
            Err(e) => log::warn!("script hot-reload disabled: {}", e),
        }
        host
    }

    /// Number of currently loaded units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn load_all(&mut self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read script directory {:?}: {}", self.dir, e);
                return;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if is_script(&path) {
                self.load_unit(&path);
            }
        }
    }

    /// Compile a unit and register it; on failure the previous version of
    /// the same unit, if any, keeps running
    fn load_unit(&mut self, path: &Path) {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                log::error!("script {:?}: {}", path, e);
                return;
            }
        };
        match ScriptUnit::compile(&self.engine, &name, &source) {
            Ok(unit) => {
                log::info!("loaded script '{}'", name);
                self.units.insert(path.to_path_buf(), unit);
            }
            Err(e) => log::error!("script {:?} not loaded: {}", path, e),
        }
    }

    /// Apply filesystem events reported since the last frame
    fn poll_reloads(&mut self) {
        let mut changed: Vec<PathBuf> = Vec::new();
        let mut removed: Vec<PathBuf> = Vec::new();
        if let Some(events) = &self.events {
            while let Ok(result) = events.try_recv() {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("script watcher: {}", e);
                        continue;
                    }
                };
                let is_remove = matches!(event.kind, EventKind::Remove(_));
                let is_change =
                    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
                for path in event.paths {
                    if !is_script(&path) {
                        continue;
                    }
                    if is_remove {
                        removed.push(path);
                    } else if is_change {
                        changed.push(path);
                    }
                }
            }
        }
        for path in removed {
            if self.units.remove(&path).is_some() {
                log::info!("unloaded script {:?}", path);
            }
        }
        changed.sort();
        changed.dedup();
        for path in changed {
            if path.is_file() {
                self.load_unit(&path);
            }
        }
    }

    /// Drain pending reloads, run every unit once against a snapshot of the
    /// engine, then apply the commands the units issued
    pub fn run_frame(&mut self, engine: &mut Engine) {
        self.poll_reloads();
        if self.units.is_empty() {
            return;
        }

        let commands = Rc::new(RefCell::new(Vec::new()));
        let position = engine.player_position();
        let handle = GameHandle {
            player_x: position.x as i64,
            player_y: position.y as i64,
            time_secs: engine.clock_secs(),
            commands: Rc::clone(&commands),
        };
        for unit in self.units.values_mut() {
            unit.run(&self.engine, handle.clone());
        }

        for command in commands.borrow().iter() {
            match *command {
                ScriptCommand::AddBomb { x, y, translate } => engine.add_bomb(x, y, translate),
            }
        }
    }
}

fn is_script(path: &Path) -> bool {
    path.extension().map(|ext| ext == "rhai").unwrap_or(false)
}

fn watch(
    dir: &Path,
) -> notify::Result<(RecommendedWatcher, Receiver<notify::Result<notify::Event>>)> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, rx))
}
