//! Audio seam: the engine only asks for a cue and waits, bounded, for it to end.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use simon_core::model::CueId;

/// Errors a cue backend may report. The engine absorbs all of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CueError {
    #[error("cue {0} is unavailable")]
    Unavailable(CueId),
    #[error("cue playback failed: {0}")]
    Playback(String),
}

/// Plays a cue and resolves when it has finished (or failed).
#[async_trait]
pub trait CuePlayer: Send + Sync {
    /// Play `cue` to completion.
    ///
    /// # Errors
    ///
    /// Returns `CueError` if the cue could not be played.
    async fn play_cue(&self, cue: CueId) -> Result<(), CueError>;
}

/// Backend that plays nothing and resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCuePlayer;

#[async_trait]
impl CuePlayer for SilentCuePlayer {
    async fn play_cue(&self, _cue: CueId) -> Result<(), CueError> {
        Ok(())
    }
}

/// How a bounded cue wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueResolution {
    Played,
    Failed,
    TimedOut,
}

/// Play a cue, giving up after `timeout`. Never returns an error: a failed or
/// silent cue is reported but must not stall the caller.
pub async fn play_bounded(player: &dyn CuePlayer, cue: CueId, timeout: Duration) -> CueResolution {
    match tokio::time::timeout(timeout, player.play_cue(cue)).await {
        Ok(Ok(())) => CueResolution::Played,
        Ok(Err(err)) => {
            log::warn!("cue {cue} failed, continuing without audio: {err}");
            CueResolution::Failed
        }
        Err(_) => {
            log::debug!("cue {cue} did not finish within {timeout:?}");
            CueResolution::TimedOut
        }
    }
}

/// Fire-and-forget variant used for press feedback. The returned handle may be
/// aborted to cut the cue short.
pub fn play_detached(
    runtime: &Handle,
    player: Arc<dyn CuePlayer>,
    cue: CueId,
    timeout: Duration,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        play_bounded(player.as_ref(), cue, timeout).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl CuePlayer for Failing {
        async fn play_cue(&self, cue: CueId) -> Result<(), CueError> {
            Err(CueError::Unavailable(cue))
        }
    }

    struct Hanging;

    #[async_trait]
    impl CuePlayer for Hanging {
        async fn play_cue(&self, _cue: CueId) -> Result<(), CueError> {
            std::future::pending().await
        }
    }

    const CUE: CueId = CueId::new("cue.test");

    #[tokio::test(start_paused = true)]
    async fn silent_player_counts_as_played() {
        let resolution = play_bounded(&SilentCuePlayer, CUE, Duration::from_millis(10)).await;
        assert_eq!(resolution, CueResolution::Played);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_absorbed() {
        let resolution = play_bounded(&Failing, CUE, Duration::from_millis(10)).await;
        assert_eq!(resolution, CueResolution::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_cue_hits_the_timeout() {
        let start = tokio::time::Instant::now();
        let resolution = play_bounded(&Hanging, CUE, Duration::from_millis(300)).await;
        assert_eq!(resolution, CueResolution::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }
}
