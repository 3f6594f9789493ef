/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    PlatformRecycled { index: usize },
    CarrotSpawned { index: usize },
    CarrotCollected { total: u32 },
    GameOver { carrots: u32 },
    Restarted,
}
