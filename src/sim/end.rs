/// Game Over scene.
///
/// Shows a fixed centred message and waits for one restart press.
/// The press starts a fresh run: score reset, pools rebuilt, player at
/// spawn. Nothing carries over between runs.

use super::event::GameEvent;
use super::world::{Phase, WorldState};

pub const GAME_OVER_TEXT: &str = "Game Over";
pub const RESTART_HINT: &str = "SPACE: Play again";

/// Feed one frame of input to the Game Over scene.
/// `restart_pressed` must be edge-triggered (a fresh press this frame).
pub fn handle_input(world: &mut WorldState, restart_pressed: bool) -> Vec<GameEvent> {
    if world.phase != Phase::GameOver || !restart_pressed {
        return vec![];
    }
    world.new_run();
    log::info!("restart: run {}", world.runs);
    vec![GameEvent::Restarted]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::carrot::CarrotPool;
    use crate::domain::entity::{FrameInput, Platform, Player, Pose};
    use crate::domain::physics::{Contacts, Physics};
    use crate::sim::step::{collect_carrot, step};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Still;

    impl Physics for Still {
        fn advance(&mut self, _: &mut Player, _: &[Platform], _: &mut CarrotPool, _: f32) -> Contacts {
            Contacts::default()
        }
    }

    fn lost_world() -> WorldState {
        let mut w = WorldState::with_rng(GameConfig::default(), StdRng::seed_from_u64(5));
        let i = w.carrots.get(0.0, 0.0);
        collect_carrot(&mut w, i);
        w.player.y = 5000.0;
        w.player.pose = Pose::Jumping;
        step(&mut w, FrameInput::default(), &mut Still, 1.0 / 60.0);
        assert_eq!(w.phase, Phase::GameOver);
        w
    }

    #[test]
    fn restart_resets_score_and_spawn() {
        let mut w = lost_world();
        assert_eq!(w.carrots_collected, 1);

        let events = handle_input(&mut w, true);
        assert_eq!(events, vec![GameEvent::Restarted]);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.carrots_collected, 0);
        assert_eq!(w.score_text, "Carrots: 0");
        assert_eq!((w.player.x, w.player.y), w.player_spawn);
        assert_eq!(w.player.pose, Pose::Standing);
        assert_eq!(w.carrots.len(), 0);
    }

    #[test]
    fn waits_without_a_press() {
        let mut w = lost_world();
        for _ in 0..30 {
            assert!(handle_input(&mut w, false).is_empty());
        }
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn restart_key_ignored_while_playing() {
        let mut w = WorldState::with_rng(GameConfig::default(), StdRng::seed_from_u64(5));
        w.carrots_collected = 2;
        assert!(handle_input(&mut w, true).is_empty());
        assert_eq!(w.carrots_collected, 2);
        assert_eq!(w.runs, 1);
    }

    #[test]
    fn restarted_run_rebuilds_platform_pool() {
        let mut w = lost_world();
        handle_input(&mut w, true);
        assert_eq!(w.platforms.len(), 5);
        for (i, p) in w.platforms.iter().enumerate() {
            assert_eq!(p.y, 150.0 * i as f32);
        }
        assert_eq!(w.camera.scroll_y, 0.0);
    }
}
