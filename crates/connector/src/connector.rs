use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

/// Metadata describing a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorMeta {
    /// Unique connector name.
    pub name: String,
    /// Connector kind (e.g. `"postgres"`, `"slack"`).
    pub kind: String,
    /// Driver version string.
    pub version: String,
    /// Capability strings (e.g. `"query"`, `"execute"`).
    pub capabilities: Vec<String>,
}

/// Strongly-typed connector trait with native `async fn`.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. For dynamic dispatch use [`DynConnector`]; every `Connector`
/// implements it via a blanket implementation.
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Metadata describing this connector.
    fn meta(&self) -> ConnectorMeta;

    /// Establish the underlying connection.
    fn connect(&self) -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;

    /// Tear down the underlying connection.
    fn disconnect(&self) -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;

    /// Verify the connector is operational.
    fn health_check(&self)
    -> impl std::future::Future<Output = Result<(), ConnectorError>> + Send;

    /// Run a read query.
    fn query(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, ConnectorError>> + Send;

    /// Run a write command.
    fn execute(
        &self,
        command: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, ConnectorError>> + Send;
}

/// Object-safe connector trait for use behind `Arc<dyn DynConnector>`.
///
/// Do not implement this directly; implement [`Connector`] and rely on
/// the blanket implementation.
#[async_trait]
pub trait DynConnector: Send + Sync + std::fmt::Debug {
    /// Metadata describing this connector.
    fn meta(&self) -> ConnectorMeta;

    /// Establish the underlying connection.
    async fn connect(&self) -> Result<(), ConnectorError>;

    /// Tear down the underlying connection.
    async fn disconnect(&self) -> Result<(), ConnectorError>;

    /// Verify the connector is operational.
    async fn health_check(&self) -> Result<(), ConnectorError>;

    /// Run a read query.
    async fn query(&self, query: &str) -> Result<serde_json::Value, ConnectorError>;

    /// Run a write command.
    async fn execute(&self, command: &str) -> Result<serde_json::Value, ConnectorError>;
}

/// Blanket implementation bridging the static and dynamic dispatch worlds.
#[async_trait]
impl<T: Connector + Sync> DynConnector for T {
    fn meta(&self) -> ConnectorMeta {
        Connector::meta(self)
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        Connector::connect(self).await
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        Connector::disconnect(self).await
    }

    async fn health_check(&self) -> Result<(), ConnectorError> {
        Connector::health_check(self).await
    }

    async fn query(&self, query: &str) -> Result<serde_json::Value, ConnectorError> {
        Connector::query(self, query).await
    }

    async fn execute(&self, command: &str) -> Result<serde_json::Value, ConnectorError> {
        Connector::execute(self, command).await
    }
}
