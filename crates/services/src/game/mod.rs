mod engine;
mod playback;
mod snapshot;

// Public API of the game subsystem.
pub use engine::GameEngine;
pub use playback::{PlaybackEnd, PlaybackScheduler, PlaybackStep};
pub use snapshot::GameSnapshot;
