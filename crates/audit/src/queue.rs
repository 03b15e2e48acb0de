use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use warden_core::AuditEntry;

use crate::error::AuditError;
use crate::fallback::FallbackFile;
use crate::retry::RetryPolicy;
use crate::writer::AuditWriter;

/// How the queue behaves when it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    /// Never drop: a full queue spills the new entry straight to the
    /// fallback file; only a double failure rejects it.
    #[default]
    Compliance,
    /// Bounded latency: a full queue drops the oldest entry and counts it.
    Performance,
}

/// Configuration for the audit queue.
#[derive(Debug, Clone)]
pub struct AuditQueueConfig {
    /// Maximum entries held in memory.
    pub capacity: usize,
    /// Maximum entries per backend write.
    pub batch_size: usize,
    /// Maximum time an entry waits before its batch is written.
    pub batch_window: Duration,
    /// Overflow behavior.
    pub mode: QueueMode,
    /// Retry policy for backend writes.
    pub retry: RetryPolicy,
}

impl Default for AuditQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            batch_size: 20,
            batch_window: Duration::from_millis(250),
            mode: QueueMode::Compliance,
            retry: RetryPolicy::default(),
        }
    }
}

/// Atomic counters tracking queue outcomes.
#[derive(Debug, Default)]
pub struct AuditQueueMetrics {
    /// Entries accepted into the queue.
    pub enqueued: AtomicU64,
    /// Entries durably written by the backend.
    pub persisted: AtomicU64,
    /// Entries spilled to the fallback file.
    pub fallback: AtomicU64,
    /// Oldest entries dropped in performance mode.
    pub dropped_oldest: AtomicU64,
    /// Individual write attempts that failed and were retried.
    pub retries: AtomicU64,
    /// Entries rejected outright (queue full and fallback failed).
    pub rejected: AtomicU64,
}

/// A plain data snapshot of [`AuditQueueMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Entries accepted into the queue.
    pub enqueued: u64,
    /// Entries durably written by the backend.
    pub persisted: u64,
    /// Entries spilled to the fallback file.
    pub fallback: u64,
    /// Oldest entries dropped in performance mode.
    pub dropped_oldest: u64,
    /// Write attempts that failed and were retried.
    pub retries: u64,
    /// Entries rejected outright.
    pub rejected: u64,
}

impl AuditQueueMetrics {
    /// Take a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            dropped_oldest: self.dropped_oldest.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

struct QueueInner {
    deque: Mutex<VecDeque<AuditEntry>>,
    notify: Notify,
    config: AuditQueueConfig,
    writer: Arc<dyn AuditWriter>,
    fallback: Arc<FallbackFile>,
    metrics: AuditQueueMetrics,
    closed: AtomicBool,
}

/// The bounded, durable audit queue.
///
/// The deque is guarded by a mutex rather than a channel so performance
/// mode can drop the oldest entry exactly, and shutdown can force-drain;
/// each operation holds the lock for one push or pop.
pub struct AuditQueue {
    inner: Arc<QueueInner>,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl AuditQueue {
    /// Create the queue and spawn its consumer worker.
    #[must_use]
    pub fn spawn(
        writer: Arc<dyn AuditWriter>,
        fallback: Arc<FallbackFile>,
        config: AuditQueueConfig,
    ) -> Self {
        let inner = Arc::new(QueueInner {
            deque: Mutex::new(VecDeque::with_capacity(config.capacity)),
            notify: Notify::new(),
            config,
            writer,
            fallback,
            metrics: AuditQueueMetrics::default(),
            closed: AtomicBool::new(false),
        });

        let token = CancellationToken::new();
        let tracker = TaskTracker::new();
        tracker.spawn(worker(Arc::clone(&inner), token.clone()));
        tracker.close();

        Self {
            inner,
            token,
            tracker,
        }
    }

    /// Accept an entry.
    ///
    /// An accepted entry is durable: it will appear in the backend or in
    /// the fallback file within a bounded time. Only a full queue whose
    /// fallback also fails (compliance mode) rejects an entry.
    pub async fn enqueue(&self, entry: AuditEntry) -> Result<(), AuditError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(AuditError::Closed);
        }

        let overflow = {
            let mut deque = self.inner.deque.lock().expect("queue mutex poisoned");
            if deque.len() < self.inner.config.capacity {
                deque.push_back(entry);
                None
            } else {
                match self.inner.config.mode {
                    QueueMode::Performance => {
                        deque.pop_front();
                        self.inner
                            .metrics
                            .dropped_oldest
                            .fetch_add(1, Ordering::Relaxed);
                        deque.push_back(entry);
                        None
                    }
                    QueueMode::Compliance => Some(entry),
                }
            }
        };

        if let Some(entry) = overflow {
            // Full queue in compliance mode: straight to the fallback file.
            match self.inner.fallback.append(&entry).await {
                Ok(()) => {
                    self.inner.metrics.fallback.fetch_add(1, Ordering::Relaxed);
                    warn!("audit queue full, entry spilled to fallback file");
                    return Ok(());
                }
                Err(e) => {
                    self.inner.metrics.rejected.fetch_add(1, Ordering::Relaxed);
                    return Err(AuditError::Rejected(e.to_string()));
                }
            }
        }

        self.inner.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Entries currently waiting in memory.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.deque.lock().expect("queue mutex poisoned").len()
    }

    /// Queue metrics.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stop accepting entries, drain up to `deadline`, then force-spill
    /// anything left to the fallback file. After a clean shutdown no
    /// accepted entry is lost.
    pub async fn shutdown(&self, deadline: Duration) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.token.cancel();

        if timeout(deadline, self.tracker.wait()).await.is_err() {
            warn!("audit worker did not drain within deadline");
        }

        // Whatever the worker could not write gets spilled here.
        let remaining: Vec<AuditEntry> = {
            let mut deque = self.inner.deque.lock().expect("queue mutex poisoned");
            deque.drain(..).collect()
        };
        if !remaining.is_empty() {
            match self.inner.fallback.append_many(&remaining).await {
                Ok(()) => {
                    self.inner
                        .metrics
                        .fallback
                        .fetch_add(remaining.len() as u64, Ordering::Relaxed);
                }
                Err(e) => {
                    error!(error = %e, lost = remaining.len(), "failed to spill entries at shutdown");
                }
            }
        }
        if let Err(e) = self.inner.fallback.sync().await {
            warn!(error = %e, "fallback fsync at shutdown failed");
        }
        info!("audit queue shutdown complete");
    }
}

impl std::fmt::Debug for AuditQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditQueue")
            .field("pending", &self.pending())
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}

/// Consumer loop: wake on new entries or the batch window, pop up to
/// `batch_size`, write with retry, spill on terminal failure.
async fn worker(inner: Arc<QueueInner>, token: CancellationToken) {
    loop {
        tokio::select! {
            () = inner.notify.notified() => {}
            () = tokio::time::sleep(inner.config.batch_window) => {}
            () = token.cancelled() => break,
        }

        loop {
            let batch = pop_batch(&inner);
            if batch.is_empty() {
                break;
            }
            write_with_retry(&inner, batch, &token).await;
        }
    }

    // Cancellation: drain whatever is left with a single best-effort
    // write, then spill.
    loop {
        let batch = pop_batch(&inner);
        if batch.is_empty() {
            break;
        }
        let result = timeout(
            inner.config.retry.attempt_timeout,
            inner.writer.write_batch(&batch),
        )
        .await;
        match result {
            Ok(Ok(())) => {
                inner
                    .metrics
                    .persisted
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
            }
            _ => spill(&inner, &batch).await,
        }
    }
}

fn pop_batch(inner: &QueueInner) -> Vec<AuditEntry> {
    let mut deque = inner.deque.lock().expect("queue mutex poisoned");
    let n = inner.config.batch_size.min(deque.len());
    deque.drain(..n).collect()
}

async fn write_with_retry(inner: &QueueInner, batch: Vec<AuditEntry>, token: &CancellationToken) {
    let policy = &inner.config.retry;

    for attempt in 0..policy.max_attempts {
        let result = timeout(policy.attempt_timeout, inner.writer.write_batch(&batch)).await;
        match result {
            Ok(Ok(())) => {
                inner
                    .metrics
                    .persisted
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
                return;
            }
            Ok(Err(e)) => {
                warn!(attempt, error = %e, "audit batch write failed");
            }
            Err(_) => {
                warn!(attempt, "audit batch write timed out");
            }
        }
        inner.metrics.retries.fetch_add(1, Ordering::Relaxed);

        if attempt + 1 < policy.max_attempts {
            tokio::select! {
                () = tokio::time::sleep(policy.delay_for(attempt)) => {}
                () = token.cancelled() => break,
            }
        }
    }

    spill(inner, &batch).await;
}

async fn spill(inner: &QueueInner, batch: &[AuditEntry]) {
    match inner.fallback.append_many(batch).await {
        Ok(()) => {
            inner
                .metrics
                .fallback
                .fetch_add(batch.len() as u64, Ordering::Relaxed);
            warn!(entries = batch.len(), "audit batch spilled to fallback file");
        }
        Err(e) => {
            // Writer and fallback both refused; nothing else can accept
            // the entries.
            error!(error = %e, entries = batch.len(), "audit batch lost: writer and fallback both failed");
        }
    }
}
