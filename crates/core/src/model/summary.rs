use chrono::{DateTime, Utc};

use crate::model::LevelId;

/// What a finished session looked like, built at game over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    level: LevelId,
    final_score: u32,
    best_score: u32,
    rounds_reached: usize,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl GameSummary {
    /// `ended_at` is clamped so it never precedes `started_at`.
    #[must_use]
    pub fn new(
        level: LevelId,
        final_score: u32,
        best_score: u32,
        rounds_reached: usize,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            level,
            final_score,
            best_score,
            rounds_reached,
            started_at,
            ended_at: ended_at.max(started_at),
        }
    }

    #[must_use]
    pub fn level(&self) -> LevelId {
        self.level
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Length of the sequence when the session ended.
    #[must_use]
    pub fn rounds_reached(&self) -> usize {
        self.rounds_reached
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.ended_at - self.started_at
    }

    #[must_use]
    pub fn is_new_best(&self) -> bool {
        self.final_score > 0 && self.final_score == self.best_score
    }
}
