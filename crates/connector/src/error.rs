use thiserror::Error;

/// Errors produced by connectors and the registry.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// No connector is registered under the requested name.
    #[error("connector not found: {0}")]
    NotFound(String),

    /// The tenant is not on the connector's grant list.
    #[error("tenant '{tenant}' is not granted access to connector '{name}'")]
    AccessDenied {
        /// The connector name.
        name: String,
        /// The rejected tenant.
        tenant: String,
    },

    /// The connector could not establish or keep a connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A read query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A write command failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// A health check did not complete within its deadline.
    #[error("health check timed out after {0} ms")]
    HealthTimeout(u64),

    /// The connector configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}
