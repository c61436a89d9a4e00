//! Shared error types for the services crate.

use thiserror::Error;

use simon_core::model::{LevelError, TimingsError};

/// Errors emitted by `GameEngine` and its configuration.
///
/// Gameplay outcomes (wrong presses, failed cues) are not errors; only
/// problems that stop the engine from starting end up here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("game engine must be created inside a tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Timings(#[from] TimingsError),
    #[error("failed to read engine config: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
