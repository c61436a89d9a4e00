use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimingsError {
    #[error("hold duration must be > 0")]
    ZeroHold,

    #[error("cue timeout must be > 0")]
    ZeroCueTimeout,
}

/// Fixed delays of the computer turn and between rounds.
///
/// Serialized as whole milliseconds (`hold_ms`, `gap_ms`, ...). Missing fields
/// take their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Upper bound on waiting for a cue to finish playing.
    #[serde(rename = "cue_timeout_ms", with = "millis")]
    cue_timeout: Duration,
    /// How long a symbol stays lit after its cue resolves.
    #[serde(rename = "hold_ms", with = "millis")]
    hold: Duration,
    /// Dark pause between two symbols.
    #[serde(rename = "gap_ms", with = "millis")]
    gap: Duration,
    /// Pause between a completed round and the next computer turn.
    #[serde(rename = "round_pause_ms", with = "millis")]
    round_pause: Duration,
    /// Upper bound on the fire-and-forget cue played for each press.
    #[serde(rename = "feedback_timeout_ms", with = "millis")]
    feedback_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            cue_timeout: Duration::from_millis(1500),
            hold: Duration::from_millis(600),
            gap: Duration::from_millis(200),
            round_pause: Duration::from_millis(800),
            feedback_timeout: Duration::from_millis(1500),
        }
    }
}

impl Timings {
    /// Build a validated set of timings.
    ///
    /// # Errors
    ///
    /// Returns `TimingsError` if `hold` or `cue_timeout` is zero.
    pub fn new(
        cue_timeout: Duration,
        hold: Duration,
        gap: Duration,
        round_pause: Duration,
        feedback_timeout: Duration,
    ) -> Result<Self, TimingsError> {
        let timings = Self {
            cue_timeout,
            hold,
            gap,
            round_pause,
            feedback_timeout,
        };
        timings.validate()?;
        Ok(timings)
    }

    /// Re-check invariants, e.g. after deserializing.
    ///
    /// # Errors
    ///
    /// Returns `TimingsError` if `hold` or `cue_timeout` is zero.
    pub fn validate(&self) -> Result<(), TimingsError> {
        if self.hold.is_zero() {
            return Err(TimingsError::ZeroHold);
        }
        if self.cue_timeout.is_zero() {
            return Err(TimingsError::ZeroCueTimeout);
        }
        Ok(())
    }

    #[must_use]
    pub fn cue_timeout(&self) -> Duration {
        self.cue_timeout
    }

    #[must_use]
    pub fn hold(&self) -> Duration {
        self.hold
    }

    #[must_use]
    pub fn gap(&self) -> Duration {
        self.gap
    }

    #[must_use]
    pub fn round_pause(&self) -> Duration {
        self.round_pause
    }

    #[must_use]
    pub fn feedback_timeout(&self) -> Duration {
        self.feedback_timeout
    }

    /// Worst-case length of a computer turn over `symbols` symbols, reached
    /// when every cue runs into its timeout.
    #[must_use]
    pub fn playback_bound(&self, symbols: usize) -> Duration {
        let per_symbol = self.cue_timeout + self.hold + self.gap;
        per_symbol.saturating_mul(u32::try_from(symbols).unwrap_or(u32::MAX))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hold_is_rejected() {
        let err = Timings::new(
            Duration::from_millis(100),
            Duration::ZERO,
            Duration::ZERO,
            Duration::ZERO,
            Duration::from_millis(100),
        )
        .unwrap_err();
        assert_eq!(err, TimingsError::ZeroHold);
    }

    #[test]
    fn zero_cue_timeout_is_rejected() {
        let err = Timings::new(
            Duration::ZERO,
            Duration::from_millis(600),
            Duration::from_millis(200),
            Duration::ZERO,
            Duration::from_millis(100),
        )
        .unwrap_err();
        assert_eq!(err, TimingsError::ZeroCueTimeout);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let timings: Timings = serde_json::from_str(r#"{ "hold_ms": 250 }"#).unwrap();
        assert_eq!(timings.hold(), Duration::from_millis(250));
        assert_eq!(timings.gap(), Timings::default().gap());
        assert!(timings.validate().is_ok());
    }

    #[test]
    fn playback_bound_scales_with_symbols() {
        let timings = Timings::default();
        assert_eq!(timings.playback_bound(0), Duration::ZERO);
        assert_eq!(
            timings.playback_bound(4),
            Duration::from_millis(4 * (1500 + 600 + 200))
        );
    }
}
