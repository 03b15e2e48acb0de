use std::time::Duration;

/// Exponential backoff policy for audit batch writes.
///
/// Delays follow `base * multiplier^attempt`, clamped to `max`, with a
/// deterministic jitter so concurrent workers do not retry in lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Initial delay before the first retry.
    pub base: Duration,
    /// Upper bound on the computed delay.
    pub max: Duration,
    /// Factor applied on each successive attempt.
    pub multiplier: f64,
    /// Total write attempts (first try included). At least 3.
    pub max_attempts: u32,
    /// Deadline applied to each individual write attempt.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Compute the delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_secs = self.base.as_secs_f64();
        // `attempt` is a small retry count, wrapping cannot occur.
        #[allow(clippy::cast_possible_wrap)]
        let raw = base_secs * self.multiplier.powi(attempt as i32);

        // Deterministic jitter: +0% to +40% by attempt number, spreading
        // retries across a window without a random number generator.
        let jitter_factor = 1.0 + 0.1 * f64::from(attempt % 5);
        let adjusted = raw * jitter_factor;

        Duration::from_secs_f64(adjusted.min(self.max.as_secs_f64()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            max: Duration::from_secs(5),
            multiplier: 2.0,
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(5),
        }
    }
}
