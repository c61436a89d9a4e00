use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("unknown level identifier: {raw}")]
    Unknown { raw: String },

    #[error("level {level} declares {symbols} symbols but {cues} cues")]
    CueCountMismatch {
        level: LevelId,
        symbols: u8,
        cues: usize,
    },

    #[error("level {level} has unsupported symbol count {symbols}")]
    InvalidSymbolCount { level: LevelId, symbols: u8 },
}

//
// ─── IDENTIFIERS ───────────────────────────────────────────────────────────────
//

/// Difficulty selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelId {
    Beginner,
    Intermediate,
    Expert,
}

impl LevelId {
    pub const ALL: [LevelId; 3] = [LevelId::Beginner, LevelId::Intermediate, LevelId::Expert];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LevelId::Beginner => "beginner",
            LevelId::Intermediate => "intermediate",
            LevelId::Expert => "expert",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelId {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(LevelId::Beginner),
            "intermediate" => Ok(LevelId::Intermediate),
            "expert" => Ok(LevelId::Expert),
            _ => Err(LevelError::Unknown { raw: s.to_owned() }),
        }
    }
}

/// Opaque audio cue token. Resolved by whatever audio backend plays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueId(&'static str);

impl CueId {
    #[must_use]
    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

//
// ─── TABLE ─────────────────────────────────────────────────────────────────────
//

static PALETTE: [CueId; 8] = [
    CueId::new("cue.green"),
    CueId::new("cue.red"),
    CueId::new("cue.yellow"),
    CueId::new("cue.blue"),
    CueId::new("cue.purple"),
    CueId::new("cue.orange"),
    CueId::new("cue.cyan"),
    CueId::new("cue.pink"),
];

const fn symbol_count(level: LevelId) -> u8 {
    match level {
        LevelId::Beginner => 4,
        LevelId::Intermediate => 6,
        LevelId::Expert => 8,
    }
}

fn cues(level: LevelId) -> &'static [CueId] {
    match level {
        LevelId::Beginner => &PALETTE[..4],
        LevelId::Intermediate => &PALETTE[..6],
        LevelId::Expert => &PALETTE[..],
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Static per-difficulty configuration: how many symbols are on the board and
/// which cue each symbol index plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    id: LevelId,
    symbol_count: u8,
    cues: &'static [CueId],
}

impl LevelConfig {
    /// Load and validate the configuration for a level.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::InvalidSymbolCount` or `LevelError::CueCountMismatch`
    /// if the built-in table is inconsistent for this level.
    pub fn load(id: LevelId) -> Result<Self, LevelError> {
        let symbols = symbol_count(id);
        let cues = cues(id);
        if !matches!(symbols, 4 | 6 | 8) {
            return Err(LevelError::InvalidSymbolCount { level: id, symbols });
        }
        if usize::from(symbols) != cues.len() {
            return Err(LevelError::CueCountMismatch {
                level: id,
                symbols,
                cues: cues.len(),
            });
        }
        Ok(Self {
            id,
            symbol_count: symbols,
            cues,
        })
    }

    /// Parse a level name and load its configuration.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::Unknown` for names outside the closed set.
    pub fn load_named(name: &str) -> Result<Self, LevelError> {
        Self::load(name.parse()?)
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn symbol_count(&self) -> u8 {
        self.symbol_count
    }

    #[must_use]
    pub fn cues(&self) -> &'static [CueId] {
        self.cues
    }

    /// Cue for a symbol index, `None` when the index is off the board.
    #[must_use]
    pub fn cue(&self, index: usize) -> Option<CueId> {
        self.cues.get(index).copied()
    }
}
