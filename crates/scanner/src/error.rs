use thiserror::Error;

/// Errors produced by the pattern scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A pattern failed to compile. Raised at construction time only;
    /// the process should treat this as fatal.
    #[error("pattern '{id}' failed to compile: {reason}")]
    InvalidPattern {
        /// The offending pattern id.
        id: String,
        /// The regex engine's message.
        reason: String,
    },

    /// The input exceeds the hard scan cap.
    #[error("input of {size} bytes exceeds the {limit} byte scan limit")]
    InputTooLarge {
        /// Size of the rejected input.
        size: usize,
        /// The configured limit.
        limit: usize,
    },
}
