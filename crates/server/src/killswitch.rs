use async_trait::async_trait;
use dashmap::DashSet;

use warden_core::{ClientId, TenantId};

/// Emergency stop for specific clients or tenants, consulted before the
/// policy engine runs.
#[async_trait]
pub trait KillSwitchChecker: Send + Sync {
    /// Return `true` if requests from this (client, tenant) pair must be
    /// refused.
    async fn is_blocked(&self, client: &ClientId, tenant: &TenantId) -> bool;
}

/// In-process kill switch backed by two sets.
#[derive(Debug, Default)]
pub struct MemoryKillSwitch {
    clients: DashSet<String>,
    tenants: DashSet<String>,
}

impl MemoryKillSwitch {
    /// Create an empty kill switch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block a client.
    pub fn block_client(&self, client: &ClientId) {
        self.clients.insert(client.to_string());
    }

    /// Block a tenant.
    pub fn block_tenant(&self, tenant: &TenantId) {
        self.tenants.insert(tenant.to_string());
    }

    /// Unblock a client.
    pub fn unblock_client(&self, client: &ClientId) {
        self.clients.remove(client.as_str());
    }

    /// Unblock a tenant.
    pub fn unblock_tenant(&self, tenant: &TenantId) {
        self.tenants.remove(tenant.as_str());
    }
}

#[async_trait]
impl KillSwitchChecker for MemoryKillSwitch {
    async fn is_blocked(&self, client: &ClientId, tenant: &TenantId) -> bool {
        self.clients.contains(client.as_str()) || self.tenants.contains(tenant.as_str())
    }
}
