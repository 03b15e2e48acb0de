use thiserror::Error;

/// Errors produced by persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable or the query failed transiently.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row could not be decoded.
    #[error("store serialization error: {0}")]
    Serialization(String),
}
