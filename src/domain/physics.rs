/// Arcade physics: gravity, one-way platform landings, carrot overlaps.
///
/// Game logic only sees the `Physics` capability: advance the bodies by
/// one frame and report what touched what. `ArcadePhysics` is the real
/// implementation; tests substitute a scripted one.
///
/// Bodies are axis-aligned boxes centred on their (x, y). Platforms are
/// static. The player collides with platforms on its bottom side only,
/// so it passes up through them and lands on the way down. Active
/// carrots fall the same way and come to rest on platforms.

use super::carrot::CarrotPool;
use super::entity::{Platform, Player};

/// How far a body's bottom may already sink into a platform top and
/// still count as landing on it this frame.
pub const LANDING_BIAS: f32 = 4.0;

/// What the physics pass observed this frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contacts {
    /// The player landed on a platform.
    pub touching_down: bool,
    /// Pool indices of live carrots overlapping the player.
    pub overlapped_carrots: Vec<usize>,
}

pub trait Physics {
    /// Step all dynamic bodies by `dt` seconds.
    fn advance(
        &mut self,
        player: &mut Player,
        platforms: &[Platform],
        carrots: &mut CarrotPool,
        dt: f32,
    ) -> Contacts;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn centered(x: f32, y: f32, w: f32, h: f32) -> Self {
        Aabb {
            min_x: x - w * 0.5,
            min_y: y - h * 0.5,
            max_x: x + w * 0.5,
            max_y: y + h * 0.5,
        }
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.min_y < other.max_y && self.max_y > other.min_y
    }

    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x && self.max_x > other.min_x
    }
}

pub struct ArcadePhysics {
    pub gravity: f32,
}

impl ArcadePhysics {
    pub fn new(gravity: f32) -> Self {
        ArcadePhysics { gravity }
    }
}

impl Physics for ArcadePhysics {
    fn advance(
        &mut self,
        player: &mut Player,
        platforms: &[Platform],
        carrots: &mut CarrotPool,
        dt: f32,
    ) -> Contacts {
        let mut contacts = Contacts::default();

        // Player
        let prev_bottom = player.bottom();
        player.vy += self.gravity * dt;
        player.x += player.vx * dt;
        player.y += player.vy * dt;
        if player.vy >= 0.0 {
            let body = Aabb::centered(player.x, player.y, player.width, player.height);
            if let Some(top) = landing_top(&body, prev_bottom, platforms) {
                player.y = top - player.height * 0.5;
                player.vy = 0.0;
                contacts.touching_down = true;
            }
        }

        // Carrots
        for carrot in carrots.iter_mut().filter(|c| c.is_live()) {
            let prev_bottom = carrot.y + carrot.height * 0.5;
            carrot.vy += self.gravity * dt;
            carrot.y += carrot.vy * dt;
            let body = Aabb::centered(carrot.x, carrot.y, carrot.width, carrot.height);
            if let Some(top) = landing_top(&body, prev_bottom, platforms) {
                carrot.y = top - carrot.height * 0.5;
                carrot.vy = 0.0;
            }
        }

        // Overlaps are reported against the settled positions.
        let player_box = Aabb::centered(player.x, player.y, player.width, player.height);
        contacts.overlapped_carrots = carrots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_live())
            .filter(|(_, c)| player_box.overlaps(&Aabb::centered(c.x, c.y, c.width, c.height)))
            .map(|(i, _)| i)
            .collect();

        contacts
    }
}

/// Top edge of the highest platform the falling body crossed this frame.
fn landing_top(body: &Aabb, prev_bottom: f32, platforms: &[Platform]) -> Option<f32> {
    platforms
        .iter()
        .filter(|p| {
            let plat = Aabb::centered(p.x, p.y, p.width, p.height);
            body.overlaps_x(&plat)
                && prev_bottom <= plat.min_y + LANDING_BIAS
                && body.max_y >= plat.min_y
        })
        .map(|p| p.top())
        .reduce(f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn player_resting_above(platform: &Platform, gap: f32) -> Player {
        let mut p = Player::new(platform.x, 0.0);
        p.y = platform.top() - p.height * 0.5 - gap;
        p
    }

    #[test]
    fn aabb_edges_do_not_overlap() {
        let a = Aabb::centered(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::centered(10.0, 0.0, 10.0, 10.0);
        let c = Aabb::centered(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn falling_player_lands_on_platform() {
        let plats = vec![Platform::new(240.0, 500.0)];
        let mut player = player_resting_above(&plats[0], 1.0);
        player.vy = 150.0;
        let mut carrots = CarrotPool::new();
        let mut phys = ArcadePhysics::new(200.0);

        let c = phys.advance(&mut player, &plats, &mut carrots, DT);
        assert!(c.touching_down);
        assert_eq!(player.vy, 0.0);
        assert!((player.bottom() - plats[0].top()).abs() < 1e-3);
    }

    #[test]
    fn rising_player_passes_through() {
        let plats = vec![Platform::new(240.0, 500.0)];
        let mut player = Player::new(240.0, plats[0].y + 10.0);
        player.vy = -300.0;
        let mut carrots = CarrotPool::new();
        let mut phys = ArcadePhysics::new(200.0);

        let c = phys.advance(&mut player, &plats, &mut carrots, DT);
        assert!(!c.touching_down);
        assert!(player.vy < 0.0);
    }

    #[test]
    fn deep_overlap_falls_through() {
        // Bottom already well inside the platform: one-way, no landing.
        let plats = vec![Platform::new(240.0, 500.0)];
        let mut player = Player::new(240.0, 0.0);
        player.y = plats[0].top() + 20.0 - player.height * 0.5;
        player.vy = 10.0;
        let mut carrots = CarrotPool::new();
        let mut phys = ArcadePhysics::new(200.0);

        let c = phys.advance(&mut player, &plats, &mut carrots, DT);
        assert!(!c.touching_down);
    }

    #[test]
    fn no_landing_without_horizontal_overlap() {
        let plats = vec![Platform::new(100.0, 500.0)];
        let mut player = player_resting_above(&plats[0], 1.0);
        player.x = 100.0 + plats[0].width * 0.5 + player.width * 0.5 + 1.0;
        player.vy = 150.0;
        let mut carrots = CarrotPool::new();
        let mut phys = ArcadePhysics::new(200.0);

        let c = phys.advance(&mut player, &plats, &mut carrots, DT);
        assert!(!c.touching_down);
    }

    #[test]
    fn gravity_integrates_velocity() {
        let mut player = Player::new(240.0, 0.0);
        let mut carrots = CarrotPool::new();
        let mut phys = ArcadePhysics::new(200.0);
        phys.advance(&mut player, &[], &mut carrots, 0.5);
        assert_eq!(player.vy, 100.0);
        assert_eq!(player.y, 50.0);
    }

    #[test]
    fn carrot_comes_to_rest_on_platform() {
        let plats = vec![Platform::new(300.0, 200.0)];
        let mut carrots = CarrotPool::new();
        let i = carrots.get(300.0, plats[0].y - plats[0].display_height());
        let mut player = Player::new(0.0, -1000.0);
        let mut phys = ArcadePhysics::new(200.0);

        for _ in 0..240 {
            phys.advance(&mut player, &plats, &mut carrots, DT);
        }
        let c = carrots.get_ref(i).unwrap();
        assert!((c.y + c.height * 0.5 - plats[0].top()).abs() < 1e-3);
    }

    #[test]
    fn overlap_reports_live_carrots_only() {
        let mut carrots = CarrotPool::new();
        let a = carrots.get(240.0, 320.0);
        let b = carrots.get(250.0, 330.0);
        carrots.get(10.0, 10.0);
        carrots.kill_and_hide(b);
        let mut player = Player::new(240.0, 320.0);
        let mut phys = ArcadePhysics::new(0.0);

        let c = phys.advance(&mut player, &[], &mut carrots, DT);
        assert_eq!(c.overlapped_carrots, vec![a]);
    }
}
