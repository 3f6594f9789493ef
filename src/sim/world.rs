/// WorldState: the complete state of a running game.
///
/// ## Pools
///
/// Platforms are a fixed array of `PLATFORM_COUNT`, built once per run
/// and only ever repositioned. Carrots live in a `CarrotPool` that
/// reuses collected instances before allocating.
///
/// ## Camera / Viewport
///
/// World units, y grows downward. `camera.scroll_y` is the world y of
/// the top of the view; the renderer maps
/// `screen = (world - scroll) * cells_per_unit`.
/// The background and the score text ignore vertical scroll.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::domain::carrot::CarrotPool;
use crate::domain::entity::{Platform, Player, PLATFORM_COUNT};

/// Initial platform x range (inclusive), in world units.
const PLATFORM_X_MIN: i32 = 80;
const PLATFORM_X_MAX: i32 = 400;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Camera: a viewport into the world.
#[derive(Clone, Debug)]
pub struct Camera {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub view_w: f32,
    pub view_h: f32,
    /// Horizontal dead zone width, centred on the view.
    pub deadzone_w: f32,
}

impl Camera {
    pub fn new(view_w: f32, view_h: f32) -> Self {
        Camera {
            scroll_x: 0.0,
            scroll_y: 0.0,
            view_w,
            view_h,
            deadzone_w: view_w * 1.5,
        }
    }

    /// Track a target. Vertical follow is exact; horizontal scroll only
    /// moves once the target leaves the dead zone.
    pub fn follow(&mut self, target_x: f32, target_y: f32) {
        self.scroll_y = target_y - self.view_h * 0.5;

        let centre = self.scroll_x + self.view_w * 0.5;
        let half_dz = self.deadzone_w * 0.5;
        if target_x < centre - half_dz {
            self.scroll_x += target_x - (centre - half_dz);
        } else if target_x > centre + half_dz {
            self.scroll_x += target_x - (centre + half_dz);
        }
    }

    /// Snap directly onto a target (no dead zone). Used on run start.
    pub fn center_on(&mut self, target_x: f32, target_y: f32) {
        self.scroll_x = target_x - self.view_w * 0.5;
        self.scroll_y = target_y - self.view_h * 0.5;
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub platforms: [Platform; PLATFORM_COUNT],
    pub carrots: CarrotPool,

    // ── Game tracking ──
    pub carrots_collected: u32,
    pub score_text: String,

    // ── Config ──
    pub config: GameConfig,
    pub player_spawn: (f32, f32),

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    pub runs: u32,
    pub rng: StdRng,

    // ── Camera / Viewport ──
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    /// Build a world seeded from config (or entropy) and start a run.
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        WorldState::with_rng(config, rng)
    }

    pub fn with_rng(config: GameConfig, mut rng: StdRng) -> Self {
        let view_w = config.world.view_width;
        let view_h = config.world.view_height;
        let spawn = (view_w * 0.5, view_h * 0.5);
        let platforms = initial_platforms(&mut rng, config.world.platform_spacing);

        let mut world = WorldState {
            player: Player::new(spawn.0, spawn.1),
            platforms,
            carrots: CarrotPool::new(),
            carrots_collected: 0,
            score_text: score_label(0),
            config,
            player_spawn: spawn,
            phase: Phase::Playing,
            tick: 0,
            runs: 1,
            rng,
            camera: Camera::new(view_w, view_h),
        };
        world.camera.center_on(spawn.0, spawn.1);
        world
    }

    /// Reinitialise for a fresh run: score reset, pools rebuilt, player
    /// back at spawn. The RNG carries on so each run differs.
    pub fn new_run(&mut self) {
        let spawn = self.player_spawn;
        self.platforms = initial_platforms(&mut self.rng, self.config.world.platform_spacing);
        self.carrots = CarrotPool::new();
        self.player = Player::new(spawn.0, spawn.1);
        self.carrots_collected = 0;
        self.score_text = score_label(0);
        self.phase = Phase::Playing;
        self.tick = 0;
        self.runs += 1;
        self.camera = Camera::new(self.config.world.view_width, self.config.world.view_height);
        self.camera.center_on(spawn.0, spawn.1);
    }

    /// Draw an offset in `[recycle_min, recycle_max)`.
    pub fn recycle_offset(&mut self) -> f32 {
        let w = &self.config.world;
        let (lo, hi) = (w.recycle_min, w.recycle_max);
        self.rng.gen_range(lo..hi)
    }
}

pub fn score_label(count: u32) -> String {
    format!("Carrots: {}", count)
}

fn initial_platforms(rng: &mut StdRng, spacing: f32) -> [Platform; PLATFORM_COUNT] {
    std::array::from_fn(|i| {
        let x = rng.gen_range(PLATFORM_X_MIN..=PLATFORM_X_MAX) as f32;
        Platform::new(x, spacing * i as f32)
    })
}
