use std::sync::Arc;

use simon_core::model::{LevelConfig, Sequence, Symbol, Timings};

use crate::audio::{CuePlayer, CueResolution, play_bounded};

/// Observable change the scheduler asks its owner to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    Activate(Symbol),
    Deactivate(Symbol),
}

/// How a computer turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    /// The owner refused a step, e.g. because the session was replaced.
    Interrupted,
}

/// Drives the computer turn: one symbol at a time, cue then hold then gap.
///
/// `play` is a plain future with suspend points only at the cue wait and the
/// two sleeps, so dropping or aborting it cancels every pending timer and cue
/// wait with it.
#[derive(Clone)]
pub struct PlaybackScheduler {
    cues: Arc<dyn CuePlayer>,
    timings: Timings,
}

impl PlaybackScheduler {
    #[must_use]
    pub fn new(cues: Arc<dyn CuePlayer>, timings: Timings) -> Self {
        Self { cues, timings }
    }

    /// Play `sequence` in order.
    ///
    /// `apply` receives every activation and deactivation and returns whether
    /// it was applied; a `false` stops playback with `PlaybackEnd::Interrupted`.
    pub async fn play<F>(&self, level: &LevelConfig, sequence: &Sequence, mut apply: F) -> PlaybackEnd
    where
        F: FnMut(PlaybackStep) -> bool,
    {
        for (position, symbol) in sequence.iter().enumerate() {
            if !apply(PlaybackStep::Activate(symbol)) {
                return PlaybackEnd::Interrupted;
            }

            let resolution = match level.cue(symbol.index()) {
                Some(cue) => play_bounded(self.cues.as_ref(), cue, self.timings.cue_timeout()).await,
                None => CueResolution::Failed,
            };
            log::debug!(
                "playback {}/{}: symbol {symbol} ({resolution:?})",
                position + 1,
                sequence.len()
            );

            tokio::time::sleep(self.timings.hold()).await;

            if !apply(PlaybackStep::Deactivate(symbol)) {
                return PlaybackEnd::Interrupted;
            }
            tokio::time::sleep(self.timings.gap()).await;
        }
        PlaybackEnd::Finished
    }
}
