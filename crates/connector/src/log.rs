use tracing::info;

use crate::connector::{Connector, ConnectorMeta};
use crate::error::ConnectorError;

/// A connector that logs queries and returns a canned result without any
/// external I/O.
///
/// Useful for local development and tests where no real data source is
/// available.
#[derive(Debug)]
pub struct LogConnector {
    name: String,
}

impl LogConnector {
    /// Create a new `LogConnector` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Connector for LogConnector {
    fn meta(&self) -> ConnectorMeta {
        ConnectorMeta {
            name: self.name.clone(),
            kind: "log".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            capabilities: vec!["query".into(), "execute".into()],
        }
    }

    #[allow(clippy::unused_async)]
    async fn connect(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn disconnect(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn health_check(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    async fn query(&self, query: &str) -> Result<serde_json::Value, ConnectorError> {
        info!(connector = %self.name, query, "log connector query");
        Ok(serde_json::json!({
            "connector": self.name,
            "rows": [],
        }))
    }

    async fn execute(&self, command: &str) -> Result<serde_json::Value, ConnectorError> {
        info!(connector = %self.name, command, "log connector execute");
        Ok(serde_json::json!({
            "connector": self.name,
            "executed": true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_returns_empty_rows() {
        let c = LogConnector::new("dev-log");
        let result = Connector::query(&c, "SELECT 1").await.unwrap();
        assert_eq!(result["connector"], "dev-log");
        assert!(result["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn execute_acknowledges() {
        let c = LogConnector::new("dev-log");
        let result = Connector::execute(&c, "UPDATE x SET y = 1").await.unwrap();
        assert_eq!(result["executed"], true);
    }

    #[test]
    fn meta_capabilities() {
        let c = LogConnector::new("dev-log");
        let meta = Connector::meta(&c);
        assert_eq!(meta.kind, "log");
        assert!(meta.capabilities.contains(&"query".to_owned()));
    }
}
