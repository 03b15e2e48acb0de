use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use warden_core::{
    ClientId, ContextId, GatewayContext, OrgId, Policy, PolicyOverride, PolicyTier, TenantId,
};

use crate::error::StoreError;
use crate::store::{ClientRecord, ClientStore, ContextStore, PolicyStore};

/// In-memory backend implementing every store trait.
///
/// Used by the default configuration and by tests. The `available` flag
/// lets failure drills simulate a backend outage: while unavailable every
/// operation returns [`StoreError::Unavailable`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    policies: RwLock<Vec<Policy>>,
    overrides: RwLock<Vec<PolicyOverride>>,
    contexts: DashMap<ContextId, GatewayContext>,
    clients: DashMap<ClientId, ClientRecord>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with the given policies.
    #[must_use]
    pub fn with_policies(policies: Vec<Policy>) -> Self {
        let store = Self::new();
        *store.policies.write().expect("policies lock poisoned") = policies;
        store
    }

    /// Insert or replace a policy.
    pub fn upsert_policy(&self, policy: Policy) {
        let mut policies = self.policies.write().expect("policies lock poisoned");
        policies.retain(|p| p.policy_id != policy.policy_id || p.tier != policy.tier);
        policies.push(policy);
    }

    /// Insert an override. Replaces any existing override for the same
    /// (policy, tenant, org) scope.
    pub fn upsert_override(&self, ov: PolicyOverride) {
        let mut overrides = self.overrides.write().expect("overrides lock poisoned");
        overrides.retain(|o| {
            o.policy_id != ov.policy_id
                || o.tenant_id != ov.tenant_id
                || o.organization_id != ov.organization_id
        });
        overrides.push(ov);
    }

    /// Register a client record.
    pub fn upsert_client(&self, record: ClientRecord) {
        self.clients.insert(record.client.id.clone(), record);
    }

    /// Simulate backend availability. While `false`, every operation
    /// returns [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    /// Override specificity: tenant+org beats tenant-only beats org-only
    /// beats global.
    fn specificity(ov: &PolicyOverride) -> u8 {
        u8::from(ov.tenant_id.is_some()) * 2 + u8::from(ov.organization_id.is_some())
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn load_policies(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Vec<(Policy, Option<PolicyOverride>)>, StoreError> {
        self.check_available()?;
        let now = Utc::now();
        let policies = self.policies.read().expect("policies lock poisoned");
        let overrides = self.overrides.read().expect("overrides lock poisoned");

        let mut rows = Vec::new();
        for policy in policies.iter() {
            let applies = match policy.tier {
                PolicyTier::System => true,
                PolicyTier::Organization => policy.organization_id.as_ref() == org,
                PolicyTier::Tenant => policy.tenant_id.as_ref() == Some(tenant),
            };
            if !applies {
                continue;
            }

            let ov = overrides
                .iter()
                .filter(|o| o.policy_id == policy.policy_id)
                .filter(|o| !o.is_expired(now))
                .filter(|o| o.tenant_id.is_none() || o.tenant_id.as_ref() == Some(tenant))
                .filter(|o| o.organization_id.is_none() || o.organization_id.as_ref() == org)
                .max_by_key(|o| Self::specificity(o))
                .cloned();

            rows.push((policy.clone(), ov));
        }
        Ok(rows)
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn put_context(&self, ctx: &GatewayContext) -> Result<(), StoreError> {
        self.check_available()?;
        self.contexts.insert(ctx.context_id.clone(), ctx.clone());
        Ok(())
    }

    async fn get_context(&self, id: &ContextId) -> Result<Option<GatewayContext>, StoreError> {
        self.check_available()?;
        Ok(self.contexts.get(id).map(|e| e.value().clone()))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        let now = Utc::now();
        let before = self.contexts.len();
        self.contexts.retain(|_, ctx| !ctx.is_expired(now));
        Ok((before - self.contexts.len()) as u64)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn get_client(&self, id: &ClientId) -> Result<Option<ClientRecord>, StoreError> {
        self.check_available()?;
        Ok(self.clients.get(id).map(|e| e.value().clone()))
    }
}
