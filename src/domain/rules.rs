/// Scroller rules: pure functions, no side effects.
///
/// These encode "what happens" for recycling, steering, wrapping and
/// losing. `sim::step` applies them to the world in a fixed order.
///
/// ### Recycling
/// ┌────────────────────────────────────┬──────────────────────────────┐
/// │ Condition                           │ Result                       │
/// ├────────────────────────────────────┼──────────────────────────────┤
/// │ platform.y >= scroll_y + view_h     │ y = scroll_y − offset        │
/// │                                     │ offset ∈ [min, max)          │
/// │ Otherwise                           │ untouched                    │
/// └────────────────────────────────────┴──────────────────────────────┘
///
/// ### Horizontal wrap
/// ┌────────────────────────────────────┬──────────────────────────────┐
/// │ x < −half                           │ x = view_w + half            │
/// │ x > view_w + half                   │ x = −half                    │
/// │ Otherwise (boundary included)       │ unchanged                    │
/// └────────────────────────────────────┴──────────────────────────────┘

use super::entity::{FrameInput, MoveDir, Platform};

/// Has this platform scrolled out through the bottom of the view?
#[inline]
pub fn needs_recycle(platform_y: f32, scroll_y: f32, view_h: f32) -> bool {
    platform_y >= scroll_y + view_h
}

/// New y for a recycled platform: `offset` units above the camera top.
#[inline]
pub fn recycled_y(scroll_y: f32, offset: f32) -> f32 {
    scroll_y - offset
}

/// Carrot spawn point directly above a platform.
#[inline]
pub fn carrot_spawn_point(platform: &Platform) -> (f32, f32) {
    (platform.x, platform.y - platform.display_height())
}

/// Horizontal velocity for this frame. No air control while grounded.
pub fn horizontal_velocity(input: FrameInput, touching_down: bool, speed: f32) -> f32 {
    if touching_down {
        return 0.0;
    }
    match input.direction() {
        Some(MoveDir::Left) => -speed,
        Some(MoveDir::Right) => speed,
        None => 0.0,
    }
}

/// Wrap an x coordinate that left the view entirely.
pub fn wrap_x(x: f32, half_width: f32, view_w: f32) -> f32 {
    if x < -half_width {
        view_w + half_width
    } else if x > view_w + half_width {
        -half_width
    } else {
        x
    }
}

/// Index of the platform with the greatest y (lowest on screen).
/// Exact ties keep the first one encountered.
pub fn bottom_most(platforms: &[Platform]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in platforms.iter().enumerate() {
        match best {
            Some(b) if p.y <= platforms[b].y => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Has the player fallen more than `margin` below the bottom platform?
#[inline]
pub fn is_lost(player_y: f32, bottom_y: f32, margin: f32) -> bool {
    player_y > bottom_y + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platforms_at(ys: &[f32]) -> Vec<Platform> {
        ys.iter().map(|&y| Platform::new(240.0, y)).collect()
    }

    // ── Recycling ──

    #[test]
    fn recycle_threshold_is_inclusive() {
        assert!(needs_recycle(640.0, 0.0, 640.0));
        assert!(needs_recycle(700.0, 0.0, 640.0));
        assert!(!needs_recycle(639.9, 0.0, 640.0));
        // camera scrolled upward
        assert!(needs_recycle(200.0, -500.0, 640.0));
        assert!(!needs_recycle(100.0, -500.0, 640.0));
    }

    #[test]
    fn recycled_y_is_above_camera() {
        assert_eq!(recycled_y(-300.0, 75.0), -375.0);
    }

    #[test]
    fn carrot_sits_one_platform_height_above() {
        let p = Platform::new(123.0, -40.0);
        let (x, y) = carrot_spawn_point(&p);
        assert_eq!(x, 123.0);
        assert_eq!(y, -40.0 - p.display_height());
    }

    // ── Steering ──

    #[test]
    fn steering_only_mid_air() {
        let left = FrameInput { left: true, right: false };
        let right = FrameInput { left: false, right: true };
        assert_eq!(horizontal_velocity(left, false, 200.0), -200.0);
        assert_eq!(horizontal_velocity(right, false, 200.0), 200.0);
        assert_eq!(horizontal_velocity(left, true, 200.0), 0.0);
        assert_eq!(horizontal_velocity(FrameInput::default(), false, 200.0), 0.0);
    }

    // ── Wrap ──

    #[test]
    fn wrap_boundary_not_wrapped() {
        assert_eq!(wrap_x(-30.0, 30.0, 480.0), -30.0);
        assert_eq!(wrap_x(510.0, 30.0, 480.0), 510.0);
    }

    #[test]
    fn wrap_one_unit_past_boundary() {
        assert_eq!(wrap_x(-31.0, 30.0, 480.0), 510.0);
        assert_eq!(wrap_x(511.0, 30.0, 480.0), -30.0);
    }

    #[test]
    fn wrap_leaves_inside_untouched() {
        assert_eq!(wrap_x(0.0, 30.0, 480.0), 0.0);
        assert_eq!(wrap_x(240.0, 30.0, 480.0), 240.0);
    }

    // ── Bottom-most scan ──

    #[test]
    fn bottom_most_picks_max_y() {
        let ps = platforms_at(&[0.0, 150.0, 600.0, 300.0, 450.0]);
        assert_eq!(bottom_most(&ps), Some(2));
    }

    #[test]
    fn bottom_most_tie_keeps_first() {
        let ps = platforms_at(&[100.0, 500.0, 20.0, 500.0]);
        assert_eq!(bottom_most(&ps), Some(1));
    }

    #[test]
    fn bottom_most_empty() {
        assert_eq!(bottom_most(&[]), None);
    }

    // ── Loss ──

    #[test]
    fn loss_is_strictly_past_margin() {
        assert!(!is_lost(800.0, 600.0, 200.0));
        assert!(is_lost(800.5, 600.0, 200.0));
        assert!(!is_lost(799.0, 600.0, 200.0));
    }
}
