//! Backoff policy for transient Gemini failures.
//!
//! Only [`ChatError::Transient`] failures (429, 5xx, timeouts, dropped
//! connections) earn another attempt. Rejected and fatal errors surface on
//! the first try.

use std::time::Duration;

use crate::ChatError;

/// Multipliers applied to the capped delay, cycled by attempt number.
const JITTER_STEPS: [f64; 4] = [0.75, 0.9, 0.6, 0.85];

/// Backoff for Gemini quota (429) and overload (5xx) responses.
///
/// Off by default: a chat turn that fails is reported to the user, who can
/// simply ask again. `--retries N` on either binary sets `max_retries`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// First pause; later ones grow by `multiplier` up to `max_delay`.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Scale each pause by a factor from [`JITTER_STEPS`].
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::with_retries(0)
    }
}

impl RetryConfig {
    /// Half a second, doubling, capped at eight seconds.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }

    /// Wait before retry number `attempt` (0-indexed).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let factor = if self.jitter {
            JITTER_STEPS[attempt as usize % JITTER_STEPS.len()]
        } else {
            1.0
        };
        Duration::from_secs_f64(capped * factor)
    }

    /// Decide what to do after `error` on the zero-based `attempt`.
    ///
    /// Returns the wait before trying again, or `None` when the error should
    /// be returned to the caller.
    pub fn next_delay(&self, error: &ChatError, attempt: u32) -> Option<Duration> {
        (error.is_retryable() && attempt < self.max_retries).then(|| self.backoff(attempt))
    }
}
