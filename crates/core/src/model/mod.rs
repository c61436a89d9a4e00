mod level;
mod score;
mod session;
mod summary;
mod symbol;
mod timings;

pub use level::{CueId, LevelConfig, LevelError, LevelId};
pub use score::ScoreKeeper;
pub use session::{GameSession, Phase, PressOutcome};
pub use summary::GameSummary;
pub use symbol::{PlayerProgress, Sequence, Symbol};
pub use timings::{Timings, TimingsError};
