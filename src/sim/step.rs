/// The step function: advances a run by one frame.
///
/// Processing order:
///   1. Physics pass (gravity, landings, overlaps)
///   2. Carrot collection for reported overlaps
///   3. Platform recycling (+ one carrot per recycled platform)
///   4. Auto-jump on ground contact
///   5. Pose update
///   6. Horizontal steering
///   7. Horizontal wrap
///   8. Loss check
///   9. Camera follow
///
/// The loss check must run after recycling: it scans platform positions
/// that recycling may have changed in the same frame.

use crate::domain::entity::FrameInput;
use crate::domain::physics::Physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{score_label, Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(
    world: &mut WorldState,
    input: FrameInput,
    physics: &mut dyn Physics,
    dt: f32,
) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    let contacts = physics.advance(&mut world.player, &world.platforms, &mut world.carrots, dt);
    for &i in &contacts.overlapped_carrots {
        if collect_carrot(world, i) {
            events.push(GameEvent::CarrotCollected { total: world.carrots_collected });
        }
    }

    resolve_recycling(world, &mut events);
    resolve_jump(world, contacts.touching_down, &mut events);
    world.player.pose = world.player.pose.next(contacts.touching_down, world.player.vy);
    world.player.vx = rules::horizontal_velocity(
        input, contacts.touching_down, world.config.physics.move_speed,
    );
    world.player.x = rules::wrap_x(
        world.player.x, world.player.half_width(), world.config.world.view_width,
    );
    if resolve_loss(world, &mut events) { return events; }

    world.camera.follow(world.player.x, world.player.y);
    events
}

/// Overlap handler: hide the carrot, drop its body, bump the score.
/// Returns false for a carrot that was already collected.
pub fn collect_carrot(world: &mut WorldState, index: usize) -> bool {
    if !world.carrots.kill_and_hide(index) { return false; }
    world.carrots_collected += 1;
    world.score_text = score_label(world.carrots_collected);
    true
}

// ══════════════════════════════════════════════════════════════
// Recycling
// ══════════════════════════════════════════════════════════════

fn resolve_recycling(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let scroll_y = world.camera.scroll_y;
    let view_h = world.camera.view_h;

    // Uncollected carrots that fell out through the bottom go back to the pool.
    let fallen: Vec<usize> = world.carrots.iter()
        .enumerate()
        .filter(|(_, c)| c.is_live() && rules::needs_recycle(c.y, scroll_y, view_h))
        .map(|(i, _)| i)
        .collect();
    for i in fallen {
        world.carrots.recycle(i);
    }

    for i in 0..world.platforms.len() {
        if !rules::needs_recycle(world.platforms[i].y, scroll_y, view_h) { continue; }

        let offset = world.recycle_offset();
        world.platforms[i].y = rules::recycled_y(scroll_y, offset);
        events.push(GameEvent::PlatformRecycled { index: i });

        let (cx, cy) = rules::carrot_spawn_point(&world.platforms[i]);
        let carrot = world.carrots.get(cx, cy);
        log::debug!(
            "platform {i} recycled to y={:.0}, carrot {carrot} spawned ({} live)",
            world.platforms[i].y, world.carrots.active_count(),
        );
        events.push(GameEvent::CarrotSpawned { index: carrot });
    }
}

// ══════════════════════════════════════════════════════════════
// Bounce
// ══════════════════════════════════════════════════════════════

fn resolve_jump(world: &mut WorldState, touching_down: bool, events: &mut Vec<GameEvent>) {
    if !touching_down { return; }
    world.player.vy = world.config.physics.jump_velocity;
    events.push(GameEvent::Jumped);
}

// ══════════════════════════════════════════════════════════════
// Loss
// ══════════════════════════════════════════════════════════════

fn resolve_loss(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let bottom = match rules::bottom_most(&world.platforms) {
        Some(i) => &world.platforms[i],
        None => return false,
    };
    if !rules::is_lost(world.player.y, bottom.y, world.config.world.loss_margin) {
        return false;
    }
    world.phase = Phase::GameOver;
    log::info!(
        "run {} over after {} frames: {} carrots",
        world.runs, world.tick, world.carrots_collected,
    );
    events.push(GameEvent::GameOver { carrots: world.carrots_collected });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::carrot::CarrotPool;
    use crate::domain::entity::{Platform, Player, Pose};
    use crate::domain::physics::{ArcadePhysics, Contacts};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    /// Physics stand-in: moves nothing, reports scripted contacts once.
    #[derive(Default)]
    struct Scripted {
        touching_down: bool,
        overlaps: Vec<usize>,
    }

    impl Physics for Scripted {
        fn advance(
            &mut self,
            _player: &mut Player,
            _platforms: &[Platform],
            _carrots: &mut CarrotPool,
            _dt: f32,
        ) -> Contacts {
            Contacts {
                touching_down: std::mem::take(&mut self.touching_down),
                overlapped_carrots: std::mem::take(&mut self.overlaps),
            }
        }
    }

    fn world() -> WorldState {
        WorldState::with_rng(GameConfig::default(), StdRng::seed_from_u64(42))
    }

    fn idle(world: &mut WorldState) -> Vec<GameEvent> {
        step(world, FrameInput::default(), &mut Scripted::default(), DT)
    }

    fn bottom_y(world: &WorldState) -> f32 {
        world.platforms[rules::bottom_most(&world.platforms).unwrap()].y
    }

    // ── Recycling ──

    #[test]
    fn idle_frame_changes_nothing() {
        let mut w = world();
        let before: Vec<f32> = w.platforms.iter().map(|p| p.y).collect();
        assert!(idle(&mut w).is_empty());
        let after: Vec<f32> = w.platforms.iter().map(|p| p.y).collect();
        assert_eq!(before, after);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn scrolled_platforms_move_above_camera() {
        let mut w = world();
        let scroll_y = -700.0;
        w.camera.scroll_y = scroll_y;
        let xs: Vec<f32> = w.platforms.iter().map(|p| p.x).collect();

        let events = idle(&mut w);
        let recycled = events.iter()
            .filter(|e| matches!(e, GameEvent::PlatformRecycled { .. }))
            .count();
        assert_eq!(recycled, 5);
        for (p, x) in w.platforms.iter().zip(xs) {
            assert!(p.y > scroll_y - 100.0 && p.y <= scroll_y - 50.0, "y = {}", p.y);
            assert_eq!(p.x, x);
        }
    }

    #[test]
    fn recycled_platform_gets_carrot_above() {
        let mut w = world();
        w.camera.scroll_y = -40.0; // only the platform at y=600 is out
        let events = idle(&mut w);

        assert_eq!(events[0], GameEvent::PlatformRecycled { index: 4 });
        assert_eq!(events[1], GameEvent::CarrotSpawned { index: 0 });
        let p = &w.platforms[4];
        let c = w.carrots.get_ref(0).unwrap();
        assert_eq!((c.x, c.y), (p.x, p.y - p.display_height()));
        assert_eq!(w.carrots.len(), 1);
    }

    #[test]
    fn five_recycles_spawn_five_active_carrots() {
        let mut w = world();
        for _ in 0..5 {
            let scroll_y = bottom_y(&w) - w.camera.view_h;
            w.camera.scroll_y = scroll_y;
            w.player.y = scroll_y + w.camera.view_h * 0.5;

            let events = idle(&mut w);
            let recycled = events.iter()
                .filter(|e| matches!(e, GameEvent::PlatformRecycled { .. }))
                .count();
            assert_eq!(recycled, 1);
            assert_eq!(w.phase, Phase::Playing);
        }
        assert_eq!(w.carrots.active_count(), 5);
        assert_eq!(w.carrots.len(), 5);
    }

    #[test]
    fn fallen_carrots_return_to_the_pool() {
        let mut w = world();
        let mut scroll_y = 0.0;
        for _ in 0..200 {
            scroll_y = bottom_y(&w) - w.camera.view_h;
            w.camera.scroll_y = scroll_y;
            w.player.y = scroll_y;
            idle(&mut w);
            assert_eq!(w.phase, Phase::Playing);
        }
        assert_eq!(w.carrots_collected, 0);
        assert!(w.carrots.len() <= 8, "pool grew to {}", w.carrots.len());
        let limit = scroll_y + w.camera.view_h;
        assert!(w.carrots.iter().filter(|c| c.is_live()).all(|c| c.y < limit));
    }

    // ── Bounce / pose ──

    #[test]
    fn touching_down_bounces() {
        let mut w = world();
        let mut phys = Scripted { touching_down: true, ..Default::default() };
        let events = step(&mut w, FrameInput::default(), &mut phys, DT);
        assert_eq!(w.player.vy, -300.0);
        assert_eq!(w.player.pose, Pose::Jumping);
        assert!(events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn falling_switches_back_to_standing() {
        let mut w = world();
        w.player.pose = Pose::Jumping;
        w.player.vy = -50.0;
        idle(&mut w);
        assert_eq!(w.player.pose, Pose::Jumping);

        w.player.vy = 5.0;
        idle(&mut w);
        assert_eq!(w.player.pose, Pose::Standing);
    }

    // ── Steering / wrap ──

    #[test]
    fn steering_only_in_the_air() {
        let mut w = world();
        let left = FrameInput { left: true, right: false };
        step(&mut w, left, &mut Scripted::default(), DT);
        assert_eq!(w.player.vx, -200.0);

        let mut grounded = Scripted { touching_down: true, ..Default::default() };
        step(&mut w, left, &mut grounded, DT);
        assert_eq!(w.player.vx, 0.0);

        let right = FrameInput { left: false, right: true };
        step(&mut w, right, &mut Scripted::default(), DT);
        assert_eq!(w.player.vx, 200.0);

        idle(&mut w);
        assert_eq!(w.player.vx, 0.0);
    }

    #[test]
    fn player_wraps_past_edges() {
        let mut w = world();
        let half = w.player.half_width();
        w.player.x = -half;
        idle(&mut w);
        assert_eq!(w.player.x, -half);

        w.player.x = -half - 1.0;
        idle(&mut w);
        assert_eq!(w.player.x, 480.0 + half);

        w.player.x = 480.0 + half + 1.0;
        idle(&mut w);
        assert_eq!(w.player.x, -half);
    }

    // ── Carrots / score ──

    #[test]
    fn three_overlaps_score_three() {
        let mut w = world();
        let ids: Vec<usize> = (0..3).map(|i| w.carrots.get(100.0 * i as f32, 0.0)).collect();
        for &i in &ids {
            let mut phys = Scripted { overlaps: vec![i], ..Default::default() };
            step(&mut w, FrameInput::default(), &mut phys, DT);
        }
        assert_eq!(w.carrots_collected, 3);
        assert_eq!(w.score_text, "Carrots: 3");
        assert_eq!(w.carrots.active_count(), 0);
    }

    #[test]
    fn collected_carrot_scores_once() {
        let mut w = world();
        let i = w.carrots.get(0.0, 0.0);
        let mut phys = Scripted { overlaps: vec![i, i], ..Default::default() };
        let events = step(&mut w, FrameInput::default(), &mut phys, DT);
        assert_eq!(w.carrots_collected, 1);
        assert_eq!(events, vec![GameEvent::CarrotCollected { total: 1 }]);
    }

    #[test]
    fn score_never_decreases() {
        let mut w = world();
        let mut last = 0;
        for n in 0..20 {
            let i = w.carrots.get(0.0, 0.0);
            let overlaps = if n % 3 == 0 { vec![] } else { vec![i] };
            let mut phys = Scripted { overlaps, ..Default::default() };
            step(&mut w, FrameInput::default(), &mut phys, DT);
            assert!(w.carrots_collected >= last);
            assert!(w.carrots_collected - last <= 1);
            last = w.carrots_collected;
        }
    }

    // ── Loss ──

    #[test]
    fn loss_fires_just_past_margin() {
        let mut w = world();
        w.player.y = bottom_y(&w) + 199.0;
        idle(&mut w);
        assert_eq!(w.phase, Phase::Playing);

        w.player.y = bottom_y(&w) + 201.0;
        let events = idle(&mut w);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(events.last(), Some(&GameEvent::GameOver { carrots: 0 }));
    }

    #[test]
    fn loss_sees_platforms_recycled_this_frame() {
        let mut w = world();
        // Safe against y=600, lost against y=450 once 600 is recycled.
        w.player.y = 700.0;
        w.camera.scroll_y = -40.0;
        idle(&mut w);
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn no_step_after_game_over() {
        let mut w = world();
        w.phase = Phase::GameOver;
        let mut phys = Scripted { touching_down: true, ..Default::default() };
        assert!(step(&mut w, FrameInput::default(), &mut phys, DT).is_empty());
        assert_eq!(w.player.vy, 0.0);
        assert_eq!(w.tick, 0);
    }

    // ── Camera ──

    #[test]
    fn camera_follows_player_vertically() {
        let mut w = world();
        w.player.y = 100.0;
        idle(&mut w);
        assert_eq!(w.camera.scroll_y, 100.0 - 320.0);
        assert_eq!(w.camera.scroll_x, 0.0);
    }

    // ── With real physics ──

    #[test]
    fn bunny_keeps_bouncing_on_a_platform() {
        let mut w = world();
        for p in w.platforms.iter_mut() { p.x = 240.0; }
        let mut phys = ArcadePhysics::new(w.config.physics.gravity);
        let mut jumps = 0;
        for _ in 0..600 {
            let events = step(&mut w, FrameInput::default(), &mut phys, DT);
            jumps += events.iter().filter(|e| **e == GameEvent::Jumped).count();
        }
        assert!(jumps >= 2, "jumps = {}", jumps);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn bunny_without_platforms_below_loses() {
        let mut w = world();
        // Push every platform out of the bunny's column.
        for p in w.platforms.iter_mut() { p.x = -1000.0; }
        let mut phys = ArcadePhysics::new(w.config.physics.gravity);
        for _ in 0..1200 {
            step(&mut w, FrameInput::default(), &mut phys, DT);
            if w.phase == Phase::GameOver { break; }
        }
        assert_eq!(w.phase, Phase::GameOver);
    }
}
