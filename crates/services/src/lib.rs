#![forbid(unsafe_code)]

pub mod audio;
pub mod config;
pub mod error;
pub mod game;

pub use simon_core::Clock;

pub use audio::{CueError, CuePlayer, CueResolution, SilentCuePlayer};
pub use config::EngineConfig;
pub use error::EngineError;
pub use game::{GameEngine, GameSnapshot, PlaybackEnd, PlaybackScheduler, PlaybackStep};
