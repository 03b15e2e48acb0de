use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use warden_core::AuditEntry;

use crate::error::AuditError;

/// Capability for persisting audit entries.
///
/// The queue holds a writer, never a database handle: the connection
/// lifecycle stays with the caller who constructed the writer.
#[async_trait]
pub trait AuditWriter: Send + Sync {
    /// Persist a batch of entries atomically enough that a success means
    /// every entry is durable.
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<(), AuditError>;
}

/// In-memory writer for tests and development.
///
/// `set_failing(true)` makes every write fail, simulating a database
/// outage for fallback-path drills.
#[derive(Debug, Default)]
pub struct MemoryAuditWriter {
    entries: Mutex<Vec<AuditEntry>>,
    failing: AtomicBool,
}

impl MemoryAuditWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle failure mode.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of everything written so far.
    #[must_use]
    pub fn written(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("writer mutex poisoned").clone()
    }

    /// Number of entries written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("writer mutex poisoned").len()
    }

    /// Return `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditWriter for MemoryAuditWriter {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<(), AuditError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError::Writer("memory writer offline".into()));
        }
        self.entries
            .lock()
            .expect("writer mutex poisoned")
            .extend_from_slice(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use warden_core::{ClientId, GatewayContext};

    use super::*;

    fn entry() -> AuditEntry {
        AuditEntry::gateway_context(GatewayContext::new(
            ClientId::new("c1"),
            Duration::minutes(5),
        ))
    }

    #[tokio::test]
    async fn writes_accumulate() {
        let w = MemoryAuditWriter::new();
        w.write_batch(&[entry(), entry()]).await.unwrap();
        w.write_batch(&[entry()]).await.unwrap();
        assert_eq!(w.len(), 3);
    }

    #[tokio::test]
    async fn failing_mode_rejects() {
        let w = MemoryAuditWriter::new();
        w.set_failing(true);
        assert!(w.write_batch(&[entry()]).await.is_err());
        assert!(w.is_empty());

        w.set_failing(false);
        w.write_batch(&[entry()]).await.unwrap();
        assert_eq!(w.len(), 1);
    }
}
