/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use env_logger::{Env, Target};

use config::GameConfig;
use domain::entity::FrameInput;
use domain::physics::ArcadePhysics;
use sim::event::GameEvent;
use sim::world::{Phase, WorldState};
use sim::{end, step};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_LEFT, KEYS_QUIT, KEYS_RESTART, KEYS_RIGHT};
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "bunnyhop.log";

fn main() {
    init_logging();

    let config = GameConfig::load();
    let mut world = WorldState::new(config.clone());
    let mut physics = ArcadePhysics::new(config.physics.gravity);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        log::error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut physics, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Bunny Hop!");
    println!("Carrots: {}", world.carrots_collected);
}

/// The terminal belongs to the renderer, so logs go to a file in the
/// temp directory. `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    let path = std::env::temp_dir().join(LOG_FILE);
    match File::create(&path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(Target::Stderr);
        }
    }
    // A second init (tests, embedding) is harmless.
    let _ = builder.try_init();
}

fn game_loop(
    world: &mut WorldState,
    physics: &mut ArcadePhysics,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::with_release_events(renderer.keyboard_enhanced());
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    log::info!("gamepad connected at start: {}", gp.connected);

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let dt = tick_rate.as_secs_f32();
    let mut last_tick = Instant::now();

    // Restart presses arrive between ticks; hold one until the next tick.
    let mut restart_latched = false;

    log::info!("run {} started", world.runs);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        if world.phase == Phase::GameOver
            && (kb.any_pressed(KEYS_RESTART) || gp.restart_pressed())
        {
            restart_latched = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let events = match world.phase {
                Phase::Playing => {
                    let input = FrameInput {
                        left: kb.any_held(KEYS_LEFT) || gp.left_held(),
                        right: kb.any_held(KEYS_RIGHT) || gp.right_held(),
                    };
                    step::step(world, input, physics, dt)
                }
                Phase::GameOver => end::handle_input(world, std::mem::take(&mut restart_latched)),
            };
            process_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    log::info!("quit after {} run(s)", world.runs);
    Ok(())
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::CarrotCollected { total } => log::debug!("carrot collected, total {total}"),
            GameEvent::GameOver { carrots } => log::debug!("game over with {carrots} carrot(s)"),
            GameEvent::PlatformRecycled { index } => log::trace!("platform {index} recycled"),
            GameEvent::CarrotSpawned { index } => log::trace!("carrot {index} spawned"),
            GameEvent::Jumped
            | GameEvent::Restarted => {}
        }
        if let (Some(engine), Some(sfx)) = (sound, Sfx::for_event(event)) {
            engine.play(sfx);
        }
    }
}
