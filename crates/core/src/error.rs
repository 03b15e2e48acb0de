use thiserror::Error;

/// Top-level error type for the Warden system.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("scan error: {0}")]
    Scan(String),

    #[error("policy error: {0}")]
    Policy(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("connector error: {0}")]
    Connector(String),

    #[error("audit error: {0}")]
    Audit(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}
