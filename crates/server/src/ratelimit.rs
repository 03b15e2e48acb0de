use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Result of an allowed rate limit check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RateLimitInfo {
    /// The configured budget for this window.
    pub limit: u64,
    /// Approximate remaining requests in the current window.
    pub remaining: u64,
    /// Seconds until the current window resets.
    pub reset_after: u64,
}

/// Returned when the budget is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitExceeded {
    /// Seconds until the caller can retry.
    pub retry_after: u64,
    /// The configured budget.
    pub limit: u64,
}

/// In-process sliding-window rate limiter.
///
/// Uses the two-window approximation (~2% error margin): the effective
/// count is `previous * weight + current`, where the weight is the
/// unexpired fraction of the previous window. Counters live in a dashmap
/// keyed by `bucket:window_start`; stale windows are pruned on the fly.
#[derive(Debug)]
pub struct RateLimiter {
    counters: DashMap<String, u64>,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter with the given window size.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            counters: DashMap::new(),
            window: window.max(Duration::from_secs(1)),
        }
    }

    /// Check and record one request for `bucket` against `limit`.
    pub fn check(&self, bucket: &str, limit: u64) -> Result<RateLimitInfo, RateLimitExceeded> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.check_at(bucket, limit, now)
    }

    /// Core check with an injectable clock.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn check_at(
        &self,
        bucket: &str,
        limit: u64,
        now: u64,
    ) -> Result<RateLimitInfo, RateLimitExceeded> {
        let window = self.window.as_secs();
        let current_start = (now / window) * window;
        let previous_start = current_start.saturating_sub(window);
        let elapsed = now - current_start;

        let current_key = format!("{bucket}:{current_start}");
        let previous_key = format!("{bucket}:{previous_start}");

        // Windows older than the previous one can never matter again.
        let stale_key = format!("{bucket}:{}", previous_start.saturating_sub(window));
        self.counters.remove(&stale_key);

        let prev_count = self.counters.get(&previous_key).map_or(0, |e| *e);
        let curr_count = self.counters.get(&current_key).map_or(0, |e| *e);

        let weight = (window.saturating_sub(elapsed)) as f64 / window as f64;
        let effective = (prev_count as f64 * weight) as u64 + curr_count;

        let reset_after = window.saturating_sub(elapsed);
        if effective >= limit {
            return Err(RateLimitExceeded {
                retry_after: reset_after.max(1),
                limit,
            });
        }

        *self.counters.entry(current_key).or_insert(0) += 1;

        Ok(RateLimitInfo {
            limit,
            remaining: limit.saturating_sub(effective + 1),
            reset_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_within_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let now = 1_200; // aligned window start

        for i in 0..5 {
            let info = limiter.check_at("client:c1", 5, now).unwrap();
            assert_eq!(info.limit, 5);
            assert_eq!(info.remaining, 5 - i - 1);
        }
        let err = limiter.check_at("client:c1", 5, now).unwrap_err();
        assert_eq!(err.limit, 5);
        assert!(err.retry_after >= 1);
    }

    #[test]
    fn buckets_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let now = 1_200;

        limiter.check_at("client:a", 1, now).unwrap();
        assert!(limiter.check_at("client:a", 1, now).is_err());
        assert!(limiter.check_at("client:b", 1, now).is_ok());
        assert!(limiter.check_at("tenant:a", 1, now).is_ok());
    }

    #[test]
    fn previous_window_weighs_in() {
        let limiter = RateLimiter::new(Duration::from_secs(60));

        // Fill the first window completely.
        for _ in 0..10 {
            limiter.check_at("b", 10, 1_200).unwrap();
        }

        // Just into the next window the weighted count is still near the
        // limit, so the request is refused.
        assert!(limiter.check_at("b", 10, 1_261).is_err());

        // Near the end of the next window the old requests have decayed.
        assert!(limiter.check_at("b", 10, 1_319).is_ok());
    }

    #[test]
    fn stale_windows_are_pruned() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        limiter.check_at("b", 10, 1_200).unwrap();
        assert_eq!(limiter.counters.len(), 1);

        // Two windows later the old counter is removed during the check.
        limiter.check_at("b", 10, 1_320).unwrap();
        assert_eq!(limiter.counters.len(), 1);
    }
}
