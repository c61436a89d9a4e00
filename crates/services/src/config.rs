use serde::{Deserialize, Serialize};
use std::path::Path;

use simon_core::model::Timings;
use simon_core::{SeededSource, SymbolSource};

use crate::error::EngineError;

/// Engine settings: playback timings and an optional fixed seed.
///
/// With `seed` set, every session draws the same sequence, which makes runs
/// reproducible. Without it each session is seeded from the OS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timings: Timings,
    pub seed: Option<u64>,
}

impl EngineConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Parse a JSON config, e.g. `{ "timings": { "hold_ms": 400 }, "seed": 7 }`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ConfigParse` for malformed JSON and
    /// `EngineError::Timings` if the timings are invalid.
    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(raw)?;
        config.timings.validate()?;
        Ok(config)
    }

    /// Read a JSON config from disk.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ConfigIo` if the file cannot be read, plus the
    /// errors of [`EngineConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Fresh symbol source for a new session.
    pub(crate) fn symbol_source(&self) -> Box<dyn SymbolSource> {
        match self.seed {
            Some(seed) => Box::new(SeededSource::from_seed(seed)),
            None => Box::new(SeededSource::from_os()),
        }
    }
}
