use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use simon_core::model::{GameSession, GameSummary, LevelConfig, LevelId, PressOutcome, Symbol};
use simon_core::{Clock, SymbolSource};

use super::playback::{PlaybackEnd, PlaybackScheduler, PlaybackStep};
use super::snapshot::GameSnapshot;
use crate::audio::{CuePlayer, play_detached};
use crate::config::EngineConfig;
use crate::error::EngineError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct EngineState {
    session: Option<GameSession>,
    best_score: u32,
    /// Bumped on every teardown. Background work captures the value it was
    /// started with and stops touching the session once it no longer matches.
    generation: u64,
    turn: Option<JoinHandle<()>>,
    feedback: Vec<JoinHandle<()>>,
    last_summary: Option<GameSummary>,
}

impl EngineState {
    fn snapshot(&self) -> GameSnapshot {
        match &self.session {
            Some(session) => GameSnapshot::from_session(session),
            None => GameSnapshot::idle(self.best_score),
        }
    }

    fn stop_feedback(&mut self) {
        for handle in self.feedback.drain(..) {
            handle.abort();
        }
    }

    fn teardown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(turn) = self.turn.take() {
            turn.abort();
        }
        self.stop_feedback();
        self.session = None;
    }
}

struct Shared {
    config: EngineConfig,
    clock: Clock,
    cues: Arc<dyn CuePlayer>,
    runtime: Handle,
    state: Mutex<EngineState>,
    snapshots: watch::Sender<GameSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &EngineState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Run a transition on the session started under `generation`.
    ///
    /// Returns false, without calling `f`, if that session is gone.
    fn transition<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut GameSession) -> bool,
    {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        let Some(session) = state.session.as_mut() else {
            return false;
        };
        let applied = f(session);
        if applied {
            self.publish(&state);
        }
        applied
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Owns one game at a time and runs its timed parts on the tokio runtime it
/// was created in.
///
/// The computer turn runs as a background task; player presses are handled
/// synchronously by [`GameEngine::submit_press`]. Dropping the engine cancels
/// everything still pending.
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl GameEngine {
    /// Create an engine bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoRuntime` outside a tokio runtime and
    /// `EngineError::Timings` if the configured timings are invalid.
    pub fn new(cues: Arc<dyn CuePlayer>, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(cues, config, Clock::system())
    }

    /// Like [`GameEngine::new`], stamping summaries with `clock`.
    ///
    /// # Errors
    ///
    /// See [`GameEngine::new`].
    pub fn with_clock(
        cues: Arc<dyn CuePlayer>,
        config: EngineConfig,
        clock: Clock,
    ) -> Result<Self, EngineError> {
        config.timings.validate()?;
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let (snapshots, _) = watch::channel(GameSnapshot::default());
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                clock,
                cues,
                runtime,
                state: Mutex::new(EngineState::default()),
                snapshots,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Start a new session on `level`, replacing any running one.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Level` if the level configuration is invalid; the
    /// engine is left idle in that case.
    pub fn start_game(&self, level: LevelId) -> Result<(), EngineError> {
        let source = self.shared.config.symbol_source();
        self.start_game_with_source(level, source)
    }

    /// Start a new session from a level name such as `"beginner"`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Level` for unknown names.
    pub fn start_game_named(&self, level: &str) -> Result<(), EngineError> {
        self.start_game(level.parse()?)
    }

    /// Start a new session drawing symbols from `source`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Level` if the level configuration is invalid.
    pub fn start_game_with_source(
        &self,
        level: LevelId,
        source: Box<dyn SymbolSource>,
    ) -> Result<(), EngineError> {
        let shared = &self.shared;
        let mut state = shared.lock();
        state.teardown();

        let level = match LevelConfig::load(level) {
            Ok(level) => level,
            Err(err) => {
                shared.publish(&state);
                return Err(err.into());
            }
        };

        log::info!(
            "starting {} game ({} symbols, best {})",
            level.id(),
            level.symbol_count(),
            state.best_score
        );
        let best_score = state.best_score;
        state.session = Some(GameSession::start(level, best_score, source, shared.clock));
        let generation = state.generation;
        state.turn = Some(shared.runtime.spawn(computer_turn(Arc::clone(shared), generation, false)));
        shared.publish(&state);
        Ok(())
    }

    /// Forward one player press.
    ///
    /// Presses outside the player's turn are dropped. Every accepted press
    /// also plays its symbol's cue without waiting for it.
    pub fn submit_press(&self, symbol: Symbol) -> PressOutcome {
        let shared = &self.shared;
        let mut state = shared.lock();
        let generation = state.generation;
        let Some(session) = state.session.as_mut() else {
            return PressOutcome::Ignored;
        };

        let outcome = session.submit_press(symbol);
        if !outcome.is_accepted() {
            log::debug!("ignoring press {symbol} during {}", session.phase());
            return outcome;
        }
        let cue = session.cue_for(symbol);
        let summary = session.summary().cloned();

        log::debug!("press {symbol}: {outcome:?}");
        match outcome {
            PressOutcome::RoundComplete { round_index, score } => {
                log::info!("round {} complete, score {score}", round_index + 1);
                state.turn = Some(shared.runtime.spawn(computer_turn(
                    Arc::clone(shared),
                    generation,
                    true,
                )));
            }
            PressOutcome::GameOver {
                final_score,
                best_score,
            } => {
                log::info!("game over with score {final_score} (best {best_score})");
                state.best_score = best_score;
                state.last_summary = summary;
            }
            PressOutcome::Accepted { .. } | PressOutcome::Ignored => {}
        }

        if let Some(cue) = cue {
            state.feedback.retain(|handle| !handle.is_finished());
            state.feedback.push(play_detached(
                &shared.runtime,
                Arc::clone(&shared.cues),
                cue,
                shared.config.timings.feedback_timeout(),
            ));
        }

        shared.publish(&state);
        outcome
    }

    /// Abort pending playback and timers and drop the session.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        if state.session.is_some() {
            log::info!("cancelling game");
        }
        state.teardown();
        self.shared.publish(&state);
    }

    //
    // ─── OBSERVERS ─────────────────────────────────────────────────────────────
    //

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver that sees every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Symbols of the current sequence, empty when idle.
    #[must_use]
    pub fn sequence(&self) -> Vec<Symbol> {
        let state = self.shared.lock();
        state
            .session
            .as_ref()
            .map(|s| s.sequence().as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Presses accepted in the open round, empty when idle.
    #[must_use]
    pub fn player_progress(&self) -> Vec<Symbol> {
        let state = self.shared.lock();
        state
            .session
            .as_ref()
            .map(|s| s.progress().as_slice().to_vec())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn best_score(&self) -> u32 {
        let state = self.shared.lock();
        state
            .session
            .as_ref()
            .map_or(state.best_score, GameSession::best_score)
    }

    /// Summary of the most recent game that ended in game over.
    #[must_use]
    pub fn last_summary(&self) -> Option<GameSummary> {
        self.shared.lock().last_summary.clone()
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        self.shared.lock().teardown();
    }
}

//
// ─── COMPUTER TURN ─────────────────────────────────────────────────────────────
//

async fn computer_turn(shared: Arc<Shared>, generation: u64, after_round: bool) {
    if after_round {
        tokio::time::sleep(shared.config.timings.round_pause()).await;
        {
            let mut state = shared.lock();
            if state.generation != generation {
                return;
            }
            state.stop_feedback();
        }
        if !shared.transition(generation, GameSession::advance_round) {
            return;
        }
    }

    let (level, sequence) = {
        let state = shared.lock();
        if state.generation != generation {
            return;
        }
        let Some(session) = state.session.as_ref() else {
            return;
        };
        (session.level().clone(), session.sequence().clone())
    };
    log::debug!("computer turn: round {}", sequence.len());

    let scheduler = PlaybackScheduler::new(Arc::clone(&shared.cues), shared.config.timings);
    let end = scheduler
        .play(&level, &sequence, |step| {
            shared.transition(generation, |session| match step {
                PlaybackStep::Activate(symbol) => session.activate(symbol),
                PlaybackStep::Deactivate(_) => session.deactivate(),
            })
        })
        .await;

    if end == PlaybackEnd::Finished && shared.transition(generation, GameSession::finish_computer_turn) {
        log::debug!("player turn: {} presses expected", sequence.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::Instant;

    use simon_core::ScriptedSource;
    use simon_core::model::{CueId, Phase, Timings};

    use crate::audio::{CueError, SilentCuePlayer};

    #[derive(Default)]
    struct Recording {
        played: Mutex<Vec<CueId>>,
    }

    impl Recording {
        fn played(&self) -> Vec<&'static str> {
            self.played.lock().unwrap().iter().map(CueId::as_str).collect()
        }
    }

    #[async_trait]
    impl CuePlayer for Recording {
        async fn play_cue(&self, cue: CueId) -> Result<(), CueError> {
            self.played.lock().unwrap().push(cue);
            Ok(())
        }
    }

    struct Hanging;

    #[async_trait]
    impl CuePlayer for Hanging {
        async fn play_cue(&self, _cue: CueId) -> Result<(), CueError> {
            std::future::pending().await
        }
    }

    fn engine() -> GameEngine {
        GameEngine::new(Arc::new(SilentCuePlayer), EngineConfig::default()).unwrap()
    }

    fn scripted(values: &[u8]) -> Box<dyn SymbolSource> {
        Box::new(ScriptedSource::new(values.to_vec()))
    }

    async fn wait_for_phase(engine: &GameEngine, phase: Phase) {
        let mut rx = engine.subscribe();
        rx.wait_for(|s| s.phase == phase).await.unwrap();
    }

    async fn clear_round(engine: &GameEngine) -> PressOutcome {
        wait_for_phase(engine, Phase::PlayerTurn).await;
        let mut last = PressOutcome::Ignored;
        for symbol in engine.sequence() {
            last = engine.submit_press(symbol);
        }
        last
    }

    #[test]
    fn engine_needs_a_runtime() {
        let result = GameEngine::new(Arc::new(SilentCuePlayer), EngineConfig::default());
        assert!(matches!(result, Err(EngineError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn new_engine_is_idle() {
        let engine = engine();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.level, None);
        assert!(!snapshot.is_player_turn);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_level_name_refuses_to_start() {
        let engine = engine();
        let err = engine.start_game_named("legendary").unwrap_err();
        assert!(matches!(err, EngineError::Level(_)));
        assert_eq!(engine.snapshot().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn first_round_plays_then_hands_over() {
        let cues = Arc::new(Recording::default());
        let engine = GameEngine::new(cues.clone(), EngineConfig::default()).unwrap();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[2]))
            .unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, Phase::ComputerTurn);
        assert_eq!(snapshot.sequence_length, 1);
        assert_eq!(snapshot.score, 0);

        wait_for_phase(&engine, Phase::PlayerTurn).await;
        assert_eq!(cues.played(), vec!["cue.yellow"]);
        assert_eq!(engine.snapshot().active_symbol, None);

        let outcome = engine.submit_press(Symbol::new(2));
        assert_eq!(
            outcome,
            PressOutcome::RoundComplete {
                round_index: 0,
                score: 1
            }
        );
        assert_eq!(engine.snapshot().score, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn active_symbol_is_visible_while_lit() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[3]))
            .unwrap();
        let mut rx = engine.subscribe();

        let lit = rx.wait_for(|s| s.active_symbol.is_some()).await.unwrap().clone();
        assert_eq!(lit.active_symbol, Some(Symbol::new(3)));
        assert_eq!(lit.phase, Phase::ComputerTurn);
    }

    #[tokio::test(start_paused = true)]
    async fn presses_during_computer_turn_are_dropped() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[1]))
            .unwrap();

        assert_eq!(engine.submit_press(Symbol::new(1)), PressOutcome::Ignored);
        assert_eq!(engine.submit_press(Symbol::new(1)), PressOutcome::Ignored);

        assert!(engine.player_progress().is_empty());
        assert_eq!(engine.snapshot().score, 0);
        assert_eq!(engine.snapshot().phase, Phase::ComputerTurn);
    }

    #[tokio::test(start_paused = true)]
    async fn next_round_extends_sequence_after_pause() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[2, 1]))
            .unwrap();
        clear_round(&engine).await;
        assert_eq!(engine.snapshot().phase, Phase::RoundComplete);

        let paused_at = Instant::now();
        let mut rx = engine.subscribe();
        rx.wait_for(|s| s.phase == Phase::ComputerTurn).await.unwrap();
        assert_eq!(paused_at.elapsed(), Timings::default().round_pause());
        assert_eq!(engine.sequence(), vec![Symbol::new(2), Symbol::new(1)]);
        assert!(engine.player_progress().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn mismatch_ends_the_game_and_keeps_prior_score() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[2, 1]))
            .unwrap();
        clear_round(&engine).await;
        wait_for_phase(&engine, Phase::PlayerTurn).await;

        engine.submit_press(Symbol::new(2));
        let outcome = engine.submit_press(Symbol::new(0));

        assert_eq!(
            outcome,
            PressOutcome::GameOver {
                final_score: 1,
                best_score: 1
            }
        );
        assert_eq!(engine.snapshot().phase, Phase::GameOver);
        assert_eq!(engine.player_progress(), vec![Symbol::new(2), Symbol::new(0)]);
        assert_eq!(engine.snapshot().score, 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(engine.snapshot().phase, Phase::GameOver);
        assert_eq!(engine.submit_press(Symbol::new(1)), PressOutcome::Ignored);

        let summary = engine.last_summary().unwrap();
        assert_eq!(summary.final_score(), 1);
        assert_eq!(summary.rounds_reached(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn every_accepted_press_plays_feedback() {
        let cues = Arc::new(Recording::default());
        let engine = GameEngine::new(cues.clone(), EngineConfig::default()).unwrap();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[0, 0]))
            .unwrap();
        clear_round(&engine).await;
        wait_for_phase(&engine, Phase::PlayerTurn).await;
        engine.submit_press(Symbol::new(3));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            cues.played(),
            vec![
                "cue.green", // round 1 playback
                "cue.green", // press
                "cue.green", // round 2 playback
                "cue.green",
                "cue.blue", // wrong press still sounds
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_audio_cannot_stall_the_computer_turn() {
        let engine = GameEngine::new(Arc::new(Hanging), EngineConfig::default()).unwrap();
        let start = Instant::now();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[1]))
            .unwrap();

        wait_for_phase(&engine, Phase::PlayerTurn).await;

        assert!(start.elapsed() <= Timings::default().playback_bound(4));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_playback_never_reaches_player_turn() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[0]))
            .unwrap();
        let mut rx = engine.subscribe();
        rx.wait_for(|s| s.active_symbol.is_some()).await.unwrap();

        engine.cancel();
        let seen = engine.snapshot();
        assert_eq!(seen.phase, Phase::Idle);
        assert_eq!(seen.active_symbol, None);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(engine.snapshot().phase, Phase::Idle);
        assert!(engine.sequence().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_round_pause_drops_next_round() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[0, 1]))
            .unwrap();
        clear_round(&engine).await;

        engine.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(engine.snapshot().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_keeps_best_and_ignores_stale_playback() {
        let engine = engine();
        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[1, 2]))
            .unwrap();
        clear_round(&engine).await;
        wait_for_phase(&engine, Phase::PlayerTurn).await;
        engine.submit_press(Symbol::new(3));
        assert_eq!(engine.best_score(), 1);

        engine
            .start_game_with_source(LevelId::Expert, scripted(&[7]))
            .unwrap();
        let mut rx = engine.subscribe();
        rx.wait_for(|s| s.active_symbol.is_some()).await.unwrap();

        engine
            .start_game_with_source(LevelId::Intermediate, scripted(&[5]))
            .unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.level, Some(LevelId::Intermediate));
        assert_eq!(snapshot.phase, Phase::ComputerTurn);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.best_score, 1);
        assert_eq!(snapshot.active_symbol, None);

        wait_for_phase(&engine, Phase::PlayerTurn).await;
        assert_eq!(engine.sequence(), vec![Symbol::new(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn best_score_is_the_max_over_games() {
        let engine = engine();

        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[1, 1, 1]))
            .unwrap();
        clear_round(&engine).await;
        clear_round(&engine).await;
        wait_for_phase(&engine, Phase::PlayerTurn).await;
        engine.submit_press(Symbol::new(0));
        assert_eq!(engine.best_score(), 2);

        engine
            .start_game_with_source(LevelId::Beginner, scripted(&[2]))
            .unwrap();
        wait_for_phase(&engine, Phase::PlayerTurn).await;
        engine.submit_press(Symbol::new(0));

        assert_eq!(engine.snapshot().score, 0);
        assert_eq!(engine.best_score(), 2);
        assert_eq!(engine.last_summary().unwrap().best_score(), 2);
    }
}
