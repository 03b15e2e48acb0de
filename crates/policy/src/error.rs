use thiserror::Error;

/// Errors produced by the policy repository and engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy store could not be reached or the load query failed.
    #[error("policy load failed: {0}")]
    Load(String),

    /// A stored policy's pattern does not compile. The snapshot load
    /// fails closed rather than silently skipping the policy.
    #[error("policy '{id}' has an invalid pattern: {reason}")]
    InvalidPattern {
        /// The offending policy id.
        id: String,
        /// The regex engine's message.
        reason: String,
    },
}
