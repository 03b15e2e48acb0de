use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use serde::Serialize;
use tokio::time::timeout;
use tracing::warn;

use warden_core::TenantId;

use crate::config::ConnectorEntry;
use crate::connector::DynConnector;
use crate::error::ConnectorError;

/// Health of one connector as seen by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorHealth {
    /// Whether the last check succeeded.
    pub healthy: bool,
    /// The failure message, when unhealthy.
    pub error: Option<String>,
    /// How long the check took.
    pub latency_ms: u64,
}

struct Registration {
    connector: Arc<dyn DynConnector>,
    allowed_tenants: Vec<String>,
}

/// Maps connector names to capabilities with a per-connector tenant grant
/// list.
///
/// Registration happens at startup; afterwards reads are concurrent and
/// never block health checks. The grant list supports the `"*"` wildcard,
/// and a service-identity permission list naming the connector bypasses
/// the grant list entirely.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: DashMap<String, Registration>,
}

impl ConnectorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under `entry`'s grant list. An existing
    /// registration with the same name is replaced.
    pub fn register(&self, connector: Arc<dyn DynConnector>, entry: &ConnectorEntry) {
        let name = connector.meta().name;
        self.connectors.insert(
            name,
            Registration {
                connector,
                allowed_tenants: entry.allowed_tenants.clone(),
            },
        );
    }

    /// Look up a connector by name without an access check.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynConnector>> {
        self.connectors.get(name).map(|r| Arc::clone(&r.connector))
    }

    /// Number of registered connectors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.connectors.len()
    }

    /// Sorted names of all registered connectors.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connectors.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Check that `tenant` may use connector `name`.
    ///
    /// A service-identity permission list takes precedence over the grant
    /// list: `"*"`, `"connector:*"` or `"connector:{name}"` grant access.
    pub fn validate_tenant_access(
        &self,
        name: &str,
        tenant: &TenantId,
        service_permissions: Option<&[String]>,
    ) -> Result<Arc<dyn DynConnector>, ConnectorError> {
        let Some(reg) = self.connectors.get(name) else {
            return Err(ConnectorError::NotFound(name.to_owned()));
        };

        if let Some(perms) = service_permissions {
            let granted = perms.iter().any(|p| {
                p == "*" || p == "connector:*" || p.strip_prefix("connector:") == Some(name)
            });
            if granted {
                return Ok(Arc::clone(&reg.connector));
            }
            // An explicit permission list that does not name the connector
            // denies access regardless of the stored grant list.
            return Err(ConnectorError::AccessDenied {
                name: name.to_owned(),
                tenant: tenant.to_string(),
            });
        }

        let granted = reg
            .allowed_tenants
            .iter()
            .any(|t| t == "*" || t == tenant.as_str());
        if granted {
            Ok(Arc::clone(&reg.connector))
        } else {
            Err(ConnectorError::AccessDenied {
                name: name.to_owned(),
                tenant: tenant.to_string(),
            })
        }
    }

    /// Check health of a single connector with a deadline.
    pub async fn health_check_single(
        &self,
        name: &str,
        deadline: Duration,
    ) -> Result<ConnectorHealth, ConnectorError> {
        let connector = self
            .get(name)
            .ok_or_else(|| ConnectorError::NotFound(name.to_owned()))?;
        Ok(check_one(connector, deadline).await)
    }

    /// Check every registered connector in parallel, each bounded by
    /// `deadline`.
    pub async fn health_check(&self, deadline: Duration) -> BTreeMap<String, ConnectorHealth> {
        let targets: Vec<(String, Arc<dyn DynConnector>)> = self
            .connectors
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(&e.value().connector)))
            .collect();

        let checks = targets.into_iter().map(|(name, connector)| async move {
            let health = check_one(connector, deadline).await;
            (name, health)
        });

        join_all(checks).await.into_iter().collect()
    }
}

async fn check_one(connector: Arc<dyn DynConnector>, deadline: Duration) -> ConnectorHealth {
    let start = std::time::Instant::now();
    let result = timeout(deadline, connector.health_check()).await;
    #[allow(clippy::cast_possible_truncation)]
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(())) => ConnectorHealth {
            healthy: true,
            error: None,
            latency_ms,
        },
        Ok(Err(e)) => {
            warn!(error = %e, "connector health check failed");
            ConnectorHealth {
                healthy: false,
                error: Some(e.to_string()),
                latency_ms,
            }
        }
        Err(_) => ConnectorHealth {
            healthy: false,
            error: Some(
                ConnectorError::HealthTimeout(deadline.as_millis().try_into().unwrap_or(u64::MAX))
                    .to_string(),
            ),
            latency_ms,
        },
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConnectorEntry;
    use crate::log::LogConnector;

    use super::*;

    fn entry(tenants: &[&str]) -> ConnectorEntry {
        ConnectorEntry {
            allowed_tenants: tenants.iter().map(ToString::to_string).collect(),
            ..ConnectorEntry::default()
        }
    }

    fn registry_with(name: &str, tenants: &[&str]) -> ConnectorRegistry {
        let reg = ConnectorRegistry::new();
        reg.register(Arc::new(LogConnector::new(name)), &entry(tenants));
        reg
    }

    #[test]
    fn register_and_get() {
        let reg = registry_with("postgres-main", &["*"]);
        assert_eq!(reg.count(), 1);
        assert!(reg.get("postgres-main").is_some());
        assert!(reg.get("missing").is_none());
        assert_eq!(reg.names(), vec!["postgres-main"]);
    }

    #[test]
    fn register_replaces_existing() {
        let reg = registry_with("c", &["*"]);
        reg.register(Arc::new(LogConnector::new("c")), &entry(&["tenant-a"]));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn wildcard_grants_all_tenants() {
        let reg = registry_with("c", &["*"]);
        assert!(
            reg.validate_tenant_access("c", &TenantId::new("anyone"), None)
                .is_ok()
        );
    }

    #[test]
    fn grant_list_enforced() {
        let reg = registry_with("c", &["tenant-a"]);
        assert!(
            reg.validate_tenant_access("c", &TenantId::new("tenant-a"), None)
                .is_ok()
        );
        let err = reg
            .validate_tenant_access("c", &TenantId::new("tenant-b"), None)
            .unwrap_err();
        assert!(matches!(err, ConnectorError::AccessDenied { .. }));
    }

    #[test]
    fn unknown_connector_not_found() {
        let reg = ConnectorRegistry::new();
        let err = reg
            .validate_tenant_access("nope", &TenantId::new("t"), None)
            .unwrap_err();
        assert!(matches!(err, ConnectorError::NotFound(_)));
    }

    #[test]
    fn service_permissions_bypass_grant_list() {
        let reg = registry_with("c", &["tenant-a"]);
        let perms = vec!["connector:c".to_owned()];
        assert!(
            reg.validate_tenant_access("c", &TenantId::new("tenant-b"), Some(&perms))
                .is_ok()
        );

        let wildcard = vec!["connector:*".to_owned()];
        assert!(
            reg.validate_tenant_access("c", &TenantId::new("tenant-b"), Some(&wildcard))
                .is_ok()
        );
    }

    #[test]
    fn service_permissions_deny_when_absent() {
        // The connector's grant list would allow this tenant, but the
        // service identity's explicit permission list wins.
        let reg = registry_with("c", &["*"]);
        let perms = vec!["connector:other".to_owned()];
        let err = reg
            .validate_tenant_access("c", &TenantId::new("tenant-a"), Some(&perms))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn health_check_all_parallel() {
        let reg = ConnectorRegistry::new();
        reg.register(Arc::new(LogConnector::new("a")), &entry(&["*"]));
        reg.register(Arc::new(LogConnector::new("b")), &entry(&["*"]));

        let statuses = reg.health_check(Duration::from_secs(1)).await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses.values().all(|h| h.healthy));
    }

    #[tokio::test]
    async fn health_check_single_unknown_errors() {
        let reg = ConnectorRegistry::new();
        let err = reg
            .health_check_single("ghost", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::NotFound(_)));
    }

    #[tokio::test]
    async fn slow_health_check_times_out() {
        #[derive(Debug)]
        struct SlowConnector;

        impl crate::connector::Connector for SlowConnector {
            fn meta(&self) -> crate::connector::ConnectorMeta {
                crate::connector::ConnectorMeta {
                    name: "slow".into(),
                    kind: "mock".into(),
                    version: "0".into(),
                    capabilities: vec![],
                }
            }
            async fn connect(&self) -> Result<(), ConnectorError> {
                Ok(())
            }
            async fn disconnect(&self) -> Result<(), ConnectorError> {
                Ok(())
            }
            async fn health_check(&self) -> Result<(), ConnectorError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }
            async fn query(&self, _q: &str) -> Result<serde_json::Value, ConnectorError> {
                Ok(serde_json::Value::Null)
            }
            async fn execute(&self, _c: &str) -> Result<serde_json::Value, ConnectorError> {
                Ok(serde_json::Value::Null)
            }
        }

        let reg = ConnectorRegistry::new();
        reg.register(Arc::new(SlowConnector), &entry(&["*"]));
        let health = reg
            .health_check_single("slow", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(!health.healthy);
        assert!(health.error.unwrap().contains("timed out"));
    }
}
