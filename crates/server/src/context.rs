use std::sync::Arc;
use std::time::Duration;

use warden_audit::AuditQueue;
use warden_auth::Authenticator;
use warden_connector::ConnectorRegistry;
use warden_policy::{PolicyEngine, PolicyRepository};
use warden_scanner::RegionalPiiDetector;
use warden_store::ContextStore;

use crate::killswitch::KillSwitchChecker;
use crate::metrics::ServerMetrics;
use crate::orchestrator::LlmOrchestrator;
use crate::pricing::PricingTable;
use crate::ratelimit::RateLimiter;

/// Request-independent settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Lifetime of an issued gateway context.
    pub context_ttl: chrono::Duration,
    /// Allow-with-tag instead of fail-closed when the policy store is
    /// down.
    pub permissive: bool,
    /// Community deployments accept requests without a license header,
    /// bound to this tenant.
    pub community_tenant: String,
    /// Deadline for each connector health check.
    pub health_deadline: Duration,
    /// Deadline for each connector data fetch during pre-check.
    pub fetch_deadline: Duration,
    /// Per-tenant rate budget per window.
    pub tenant_rate_limit: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            context_ttl: chrono::Duration::minutes(5),
            permissive: false,
            community_tenant: "default".to_owned(),
            health_deadline: Duration::from_secs(2),
            fetch_deadline: Duration::from_secs(5),
            tenant_rate_limit: 1200,
        }
    }
}

/// Every collaborator a request handler needs, constructor-injected and
/// passed down as axum state. There are no global singletons.
#[derive(Clone)]
pub struct ServiceContext {
    /// The static policy engine.
    pub engine: PolicyEngine,
    /// The policy snapshot repository.
    pub policies: Arc<PolicyRepository>,
    /// Client and user authentication.
    pub auth: Arc<Authenticator>,
    /// The tenant-scoped connector registry.
    pub connectors: Arc<ConnectorRegistry>,
    /// The durable audit queue.
    pub audit: Arc<AuditQueue>,
    /// Gateway context persistence.
    pub contexts: Arc<dyn ContextStore>,
    /// Optional emergency stop.
    pub kill_switch: Option<Arc<dyn KillSwitchChecker>>,
    /// Optional rate limiter.
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Regional PII detectors, consulted before the policy engine.
    pub regional: Arc<Vec<Arc<dyn RegionalPiiDetector>>>,
    /// Provider/model pricing table.
    pub pricing: PricingTable,
    /// Request counters.
    pub metrics: Arc<ServerMetrics>,
    /// Downstream orchestrator for Proxy Mode, when enabled.
    pub orchestrator: Option<Arc<dyn LlmOrchestrator>>,
    /// Resolved runtime settings.
    pub settings: RuntimeSettings,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("settings", &self.settings)
            .field("connectors", &self.connectors.count())
            .finish_non_exhaustive()
    }
}
