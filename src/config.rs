/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub physics: PhysicsConfig,
    pub world: WorldConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed. `None` = seed from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_velocity: f32,  // negative = upward
    pub move_speed: f32,
}

#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub view_width: f32,
    pub view_height: f32,
    pub platform_spacing: f32,
    pub recycle_min: f32,
    pub recycle_max: f32,    // exclusive
    pub loss_margin: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_view_width")]
    view_width: f32,
    #[serde(default = "default_view_height")]
    view_height: f32,
    #[serde(default = "default_platform_spacing")]
    platform_spacing: f32,
    #[serde(default = "default_recycle_min")]
    recycle_min: f32,
    #[serde(default = "default_recycle_max")]
    recycle_max: f32,
    #[serde(default = "default_loss_margin")]
    loss_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 fps
fn default_gravity() -> f32 { 200.0 }
fn default_jump_velocity() -> f32 { -300.0 }
fn default_move_speed() -> f32 { 200.0 }
fn default_view_width() -> f32 { 480.0 }
fn default_view_height() -> f32 { 640.0 }
fn default_platform_spacing() -> f32 { 150.0 }
fn default_recycle_min() -> f32 { 50.0 }
fn default_recycle_max() -> f32 { 100.0 }
fn default_loss_margin() -> f32 { 200.0 }

fn default_restart() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_velocity: default_jump_velocity(),
            move_speed: default_move_speed(),
        }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            view_width: default_view_width(),
            view_height: default_view_height(),
            platform_spacing: default_platform_spacing(),
            recycle_min: default_recycle_min(),
            recycle_max: default_recycle_max(),
            loss_margin: default_loss_margin(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        GameConfig::from_toml(load_toml(&search_dirs))
    }

    /// Parse a config document. Used by `load` and by tests.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let w = &cfg.world;
        let mut world = WorldConfig {
            view_width: positive_or("world.view_width", w.view_width, default_view_width()),
            view_height: positive_or("world.view_height", w.view_height, default_view_height()),
            platform_spacing: finite_or(
                "world.platform_spacing", w.platform_spacing, default_platform_spacing(),
            ),
            recycle_min: finite_or("world.recycle_min", w.recycle_min, default_recycle_min()),
            recycle_max: finite_or("world.recycle_max", w.recycle_max, default_recycle_max()),
            loss_margin: finite_or("world.loss_margin", w.loss_margin, default_loss_margin()),
        };
        // An empty or inverted range would panic in gen_range.
        if !(world.recycle_min < world.recycle_max) {
            log::warn!(
                "recycle_max ({}) must exceed recycle_min ({}); using defaults",
                world.recycle_max, world.recycle_min,
            );
            world.recycle_min = default_recycle_min();
            world.recycle_max = default_recycle_max();
        }

        let p = &cfg.physics;
        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(1),
            },
            physics: PhysicsConfig {
                gravity: finite_or("physics.gravity", p.gravity, default_gravity()),
                jump_velocity: finite_or(
                    "physics.jump_velocity", p.jump_velocity, default_jump_velocity(),
                ),
                move_speed: finite_or("physics.move_speed", p.move_speed, default_move_speed()),
            },
            world,
            gamepad: GamepadConfig {
                restart: cfg.gamepad.restart,
                quit: cfg.gamepad.quit,
            },
            seed: cfg.general.seed,
        }
    }
}

/// TOML accepts `nan` and `inf`; neither is a usable setting.
fn finite_or(key: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("{key} = {value} is not a finite number; using {default}");
        default
    }
}

fn positive_or(key: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("{key} = {value} must be a positive number; using {default}");
        default
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG config home (~/.config/bunnyhop)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".config/bunnyhop");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return read_toml(&path);
        }
    }
    log::info!("no config.toml found, using defaults");
    TomlConfig::default()
}

fn read_toml(path: &Path) -> TomlConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("config.toml parse error: {e}; using default settings");
                TomlConfig::default()
            }
        },
        Err(e) => {
            log::warn!("could not read {}: {e}", path.display());
            TomlConfig::default()
        }
    }
}
