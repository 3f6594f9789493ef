/// Entities: Player, Platform, and the per-frame input.
/// Carrots live in `carrot.rs` together with their pool.

/// Display size of the bunny (0.5 scale of the source art).
pub const PLAYER_WIDTH: f32 = 60.0;
pub const PLAYER_HEIGHT: f32 = 95.0;

/// Display size of a platform (0.5 scale of the grass strip).
pub const PLATFORM_WIDTH: f32 = 190.0;
pub const PLATFORM_HEIGHT: f32 = 47.0;

/// Fixed platform pool size for a run.
pub const PLATFORM_COUNT: usize = 5;

/// Player pose. Which texture is shown is a pure function of
/// ground contact and the sign of vertical velocity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pose {
    Standing,
    Jumping,
}

impl Pose {
    /// Resolve the pose for this frame.
    ///
    /// Grounded always means a fresh jump. Otherwise a falling body
    /// (vy > 0) reverts to Standing; rising keeps the current pose.
    pub fn next(self, touching_down: bool, vy: f32) -> Pose {
        if touching_down {
            Pose::Jumping
        } else if vy > 0.0 {
            Pose::Standing
        } else {
            self
        }
    }

    /// Logical texture key.
    pub fn texture(self) -> &'static str {
        match self {
            Pose::Standing => "bunny-stand",
            Pose::Jumping => "bunny-jump",
        }
    }
}

/// Horizontal steering direction (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Frame input for the Playing phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
}

impl FrameInput {
    /// Left wins when both are held.
    pub fn direction(&self) -> Option<MoveDir> {
        if self.left {
            Some(MoveDir::Left)
        } else if self.right {
            Some(MoveDir::Right)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub pose: Pose,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            x, y,
            vx: 0.0,
            vy: 0.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            pose: Pose::Standing,
        }
    }

    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height * 0.5
    }
}

/// Static platform body. Repositioned in place when recycled.
#[derive(Clone, Debug)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32) -> Self {
        Platform { x, y, width: PLATFORM_WIDTH, height: PLATFORM_HEIGHT }
    }

    pub fn top(&self) -> f32 {
        self.y - self.height * 0.5
    }

    pub fn display_height(&self) -> f32 {
        self.height
    }
}
