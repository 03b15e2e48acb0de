use async_trait::async_trait;

use warden_core::{
    Client, ClientId, ContextId, GatewayContext, OrgId, Policy, PolicyOverride, TenantId,
};

use crate::error::StoreError;

/// A stored client together with the hash of its issued API key.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    /// The client row.
    pub client: Client,
    /// SHA-256 hex of the raw license key issued to this client
    /// (legacy API-key path).
    pub license_key_hash: String,
}

/// Loads the policies applicable to a (tenant, org) scope.
///
/// One load materialises all applicable rows: the system tier always,
/// the organization tier when `org` matches, the tenant tier when
/// `tenant` matches — each with at most one live override.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load applicable policies with their matching non-expired override.
    async fn load_policies(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Vec<(Policy, Option<PolicyOverride>)>, StoreError>;
}

/// Persists and retrieves gateway pre-check contexts.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Persist a context.
    async fn put_context(&self, ctx: &GatewayContext) -> Result<(), StoreError>;

    /// Fetch a context by id. `Ok(None)` means the id is unknown.
    async fn get_context(&self, id: &ContextId) -> Result<Option<GatewayContext>, StoreError>;

    /// Remove expired contexts. Returns the number deleted.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}

/// Looks up registered client applications.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Fetch a client record by id. `Ok(None)` means the id is unknown.
    async fn get_client(&self, id: &ClientId) -> Result<Option<ClientRecord>, StoreError>;
}
