/// Carrot entity and its reuse pool.
///
/// A carrot is spawned above a recycled platform, falls under gravity
/// until it rests on a platform, and is collected on overlap with the
/// player. Collected carrots stay in the pool and are handed out again
/// by `CarrotPool::get` before the pool grows.

pub const CARROT_WIDTH: f32 = 32.0;
pub const CARROT_HEIGHT: f32 = 38.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CarrotState {
    Spawned,
    Collected,
}

#[derive(Clone, Debug)]
pub struct Carrot {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    pub visible: bool,
    pub body_enabled: bool,
    pub state: CarrotState,
}

impl Carrot {
    fn spawned(x: f32, y: f32) -> Self {
        Carrot {
            x, y,
            vy: 0.0,
            width: CARROT_WIDTH,
            height: CARROT_HEIGHT,
            active: true,
            visible: true,
            body_enabled: true,
            state: CarrotState::Spawned,
        }
    }

    /// Reset in place for another spawn.
    fn respawn(&mut self, x: f32, y: f32) {
        *self = Carrot::spawned(x, y);
    }

    fn release(&mut self) {
        self.active = false;
        self.visible = false;
        self.body_enabled = false;
    }

    /// Does this carrot take part in physics and overlaps?
    pub fn is_live(&self) -> bool {
        self.active && self.body_enabled
    }
}

#[derive(Clone, Debug, Default)]
pub struct CarrotPool {
    carrots: Vec<Carrot>,
}

impl CarrotPool {
    pub fn new() -> Self {
        CarrotPool { carrots: Vec::new() }
    }

    /// Acquire a carrot at (x, y): the first inactive one, or a new one.
    /// Returns the pool index.
    pub fn get(&mut self, x: f32, y: f32) -> usize {
        if let Some(i) = self.carrots.iter().position(|c| !c.active) {
            self.carrots[i].respawn(x, y);
            i
        } else {
            self.carrots.push(Carrot::spawned(x, y));
            self.carrots.len() - 1
        }
    }

    /// Hide the carrot and drop it from the physics world.
    /// Returns false if it was already collected (or out of range).
    pub fn kill_and_hide(&mut self, index: usize) -> bool {
        match self.carrots.get_mut(index) {
            Some(c) if c.active && c.state == CarrotState::Spawned => {
                c.release();
                c.state = CarrotState::Collected;
                true
            }
            _ => false,
        }
    }

    /// Return an uncollected carrot to the pool without collecting it.
    /// Returns false if it was not active.
    pub fn recycle(&mut self, index: usize) -> bool {
        match self.carrots.get_mut(index) {
            Some(c) if c.active => {
                c.release();
                true
            }
            _ => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.carrots.iter().filter(|c| c.active).count()
    }

    /// Total instances ever allocated (active + pooled).
    pub fn len(&self) -> usize {
        self.carrots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.carrots.is_empty()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get_ref(&self, index: usize) -> Option<&Carrot> {
        self.carrots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Carrot> {
        self.carrots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Carrot> {
        self.carrots.iter_mut()
    }
}
