use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking gateway request outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time
/// view, call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Pre-check requests handled.
    pub pre_checks: AtomicU64,
    /// Pre-checks that approved the request.
    pub approved: AtomicU64,
    /// Pre-checks that blocked the request.
    pub blocked: AtomicU64,
    /// LLM call audits recorded.
    pub audits_recorded: AtomicU64,
    /// Requests refused by the rate limiter.
    pub rate_limited: AtomicU64,
    /// Requests refused by the kill switch.
    pub kill_switch_blocks: AtomicU64,
}

impl ServerMetrics {
    /// Increment the pre-check counter.
    pub fn increment_pre_checks(&self) {
        self.pre_checks.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the approved counter.
    pub fn increment_approved(&self) {
        self.approved.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the blocked counter.
    pub fn increment_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the audits-recorded counter.
    pub fn increment_audits(&self) {
        self.audits_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rate-limited counter.
    pub fn increment_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the kill-switch counter.
    pub fn increment_kill_switch(&self) {
        self.kill_switch_blocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> ServerMetricsSnapshot {
        ServerMetricsSnapshot {
            pre_checks: self.pre_checks.load(Ordering::Relaxed),
            approved: self.approved.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            audits_recorded: self.audits_recorded.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            kill_switch_blocks: self.kill_switch_blocks.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ServerMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ServerMetricsSnapshot {
    /// Pre-check requests handled.
    pub pre_checks: u64,
    /// Pre-checks that approved the request.
    pub approved: u64,
    /// Pre-checks that blocked the request.
    pub blocked: u64,
    /// LLM call audits recorded.
    pub audits_recorded: u64,
    /// Requests refused by the rate limiter.
    pub rate_limited: u64,
    /// Requests refused by the kill switch.
    pub kill_switch_blocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let m = ServerMetrics::default();
        let snap = m.snapshot();
        assert_eq!(snap.pre_checks, 0);
        assert_eq!(snap.blocked, 0);
        assert_eq!(snap.audits_recorded, 0);
    }

    #[test]
    fn increments_visible_in_snapshot() {
        let m = ServerMetrics::default();
        m.increment_pre_checks();
        m.increment_pre_checks();
        m.increment_approved();
        m.increment_blocked();
        m.increment_audits();
        m.increment_rate_limited();
        m.increment_kill_switch();

        let snap = m.snapshot();
        assert_eq!(snap.pre_checks, 2);
        assert_eq!(snap.approved, 1);
        assert_eq!(snap.blocked, 1);
        assert_eq!(snap.audits_recorded, 1);
        assert_eq!(snap.rate_limited, 1);
        assert_eq!(snap.kill_switch_blocks, 1);
    }
}
