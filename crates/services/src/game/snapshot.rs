use simon_core::model::{GameSession, LevelId, Phase, Symbol};

/// Read-only view of the engine, published after every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub level: Option<LevelId>,
    pub sequence_length: usize,
    pub progress_length: usize,
    pub score: u32,
    pub best_score: u32,
    pub active_symbol: Option<Symbol>,
    pub is_player_turn: bool,
}

impl GameSnapshot {
    /// Snapshot with no session running.
    #[must_use]
    pub fn idle(best_score: u32) -> Self {
        Self {
            best_score,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            phase: session.phase(),
            level: Some(session.level().id()),
            sequence_length: session.sequence().len(),
            progress_length: session.progress().len(),
            score: session.score(),
            best_score: session.best_score(),
            active_symbol: session.active_symbol(),
            is_player_turn: session.is_player_turn(),
        }
    }
}
