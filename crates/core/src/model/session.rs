use chrono::{DateTime, Utc};
use std::fmt;

use crate::generator::{SequenceGenerator, SymbolSource};
use crate::model::{CueId, GameSummary, LevelConfig, PlayerProgress, ScoreKeeper, Sequence, Symbol};
use crate::time::Clock;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// State of the game state machine.
///
/// `Idle` is never held by a live `GameSession`; it is what owners report when
/// there is no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Preparing,
    ComputerTurn,
    PlayerTurn,
    RoundComplete,
    GameOver,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Preparing => "preparing",
            Phase::ComputerTurn => "computer-turn",
            Phase::PlayerTurn => "player-turn",
            Phase::RoundComplete => "round-complete",
            Phase::GameOver => "game-over",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PRESS OUTCOME ─────────────────────────────────────────────────────────────
//

/// Result of forwarding one player press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Not the player's turn, the round is already full, or the symbol is off
    /// the board. Nothing changed.
    Ignored,
    /// Correct press, more expected this round.
    Accepted { matched: usize },
    /// Last press of the round was correct.
    ///
    /// `round_index` is 0-based and equals `sequence.len() - 1`, which is also
    /// the score held before this round was credited. `score` is the updated
    /// count of completed rounds.
    RoundComplete { round_index: usize, score: u32 },
    /// Wrong press. The session is over.
    GameOver { final_score: u32, best_score: u32 },
}

impl PressOutcome {
    /// True for every outcome that consumed the press.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, PressOutcome::Ignored)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One game from `start` to game over.
///
/// All mutation goes through the transition methods below; each checks the
/// current phase and does nothing when called out of turn.
pub struct GameSession {
    level: LevelConfig,
    sequence: Sequence,
    progress: PlayerProgress,
    scores: ScoreKeeper,
    phase: Phase,
    active_symbol: Option<Symbol>,
    source: Box<dyn SymbolSource>,
    clock: Clock,
    started_at: DateTime<Utc>,
    summary: Option<GameSummary>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("level", &self.level.id())
            .field("sequence", &self.sequence)
            .field("progress", &self.progress)
            .field("scores", &self.scores)
            .field("phase", &self.phase)
            .field("active_symbol", &self.active_symbol)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Start a fresh session: score 0, empty progress, first symbol drawn.
    ///
    /// Returns the session in `ComputerTurn` for round 1. `best_score` carries
    /// over from earlier sessions of the same owner.
    #[must_use]
    pub fn start(
        level: LevelConfig,
        best_score: u32,
        source: Box<dyn SymbolSource>,
        clock: Clock,
    ) -> Self {
        let mut session = Self {
            level,
            sequence: Sequence::new(),
            progress: PlayerProgress::default(),
            scores: ScoreKeeper::with_best(best_score),
            phase: Phase::Preparing,
            active_symbol: None,
            source,
            clock,
            started_at: clock.now(),
            summary: None,
        };
        session.prepare_round();
        session
    }

    fn prepare_round(&mut self) {
        debug_assert_eq!(self.phase, Phase::Preparing);
        self.progress.clear();
        self.active_symbol = None;
        self.sequence = SequenceGenerator::next(
            &self.sequence,
            self.level.symbol_count(),
            self.source.as_mut(),
        );
        self.phase = Phase::ComputerTurn;
    }

    //
    // ─── COMPUTER TURN ─────────────────────────────────────────────────────────
    //

    /// Light a symbol during playback. Returns false outside `ComputerTurn`.
    pub fn activate(&mut self, symbol: Symbol) -> bool {
        if self.phase != Phase::ComputerTurn {
            return false;
        }
        self.active_symbol = Some(symbol);
        true
    }

    /// Turn the lit symbol off. Returns false outside `ComputerTurn`.
    pub fn deactivate(&mut self) -> bool {
        if self.phase != Phase::ComputerTurn {
            return false;
        }
        self.active_symbol = None;
        true
    }

    /// Hand the turn to the player once playback has finished.
    pub fn finish_computer_turn(&mut self) -> bool {
        if self.phase != Phase::ComputerTurn {
            return false;
        }
        self.active_symbol = None;
        self.phase = Phase::PlayerTurn;
        true
    }

    //
    // ─── PLAYER TURN ───────────────────────────────────────────────────────────
    //

    /// Validate one press against the sequence.
    ///
    /// Presses outside `PlayerTurn`, presses once the round is full, and
    /// symbols off the board are dropped without touching any state.
    pub fn submit_press(&mut self, symbol: Symbol) -> PressOutcome {
        if self.phase != Phase::PlayerTurn
            || self.progress.len() >= self.sequence.len()
            || symbol.value() >= self.level.symbol_count()
        {
            return PressOutcome::Ignored;
        }

        let position = self.progress.len();
        self.progress.push(symbol);

        if self.sequence.get(position) != Some(symbol) {
            return self.end_game();
        }

        if self.progress.len() < self.sequence.len() {
            return PressOutcome::Accepted {
                matched: self.progress.len(),
            };
        }

        let round_index = self.sequence.len() - 1;
        self.scores.complete_round();
        self.phase = Phase::RoundComplete;
        PressOutcome::RoundComplete {
            round_index,
            score: self.scores.score(),
        }
    }

    fn end_game(&mut self) -> PressOutcome {
        let best_score = self.scores.record_game_over();
        let final_score = self.scores.score();
        self.phase = Phase::GameOver;
        self.active_symbol = None;
        self.summary = Some(GameSummary::new(
            self.level.id(),
            final_score,
            best_score,
            self.sequence.len(),
            self.started_at,
            self.clock.now(),
        ));
        PressOutcome::GameOver {
            final_score,
            best_score,
        }
    }

    /// Leave `RoundComplete` and set up the next computer turn with a sequence
    /// one symbol longer.
    pub fn advance_round(&mut self) -> bool {
        if self.phase != Phase::RoundComplete {
            return false;
        }
        self.phase = Phase::Preparing;
        self.prepare_round();
        true
    }

    //
    // ─── READ-ONLY STATE ───────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.scores.score()
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.scores.best()
    }

    #[must_use]
    pub fn active_symbol(&self) -> Option<Symbol> {
        self.active_symbol
    }

    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.phase == Phase::PlayerTurn
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Summary of the finished game, `None` until game over.
    #[must_use]
    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Cue the level assigns to `symbol`.
    #[must_use]
    pub fn cue_for(&self, symbol: Symbol) -> Option<CueId> {
        self.level.cue(symbol.index())
    }
}
