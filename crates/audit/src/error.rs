use thiserror::Error;

/// Errors produced by the audit subsystem.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The queue is full and the fallback file also refused the entry.
    /// This is the only condition under which an entry is rejected.
    #[error("audit queue full and fallback unavailable: {0}")]
    Rejected(String),

    /// The queue has been shut down.
    #[error("audit queue closed")]
    Closed,

    /// The backing writer failed.
    #[error("audit write failed: {0}")]
    Writer(String),

    /// The fallback file could not be opened or appended.
    #[error("fallback file error: {0}")]
    Fallback(String),
}
