use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tracing::debug;

use warden_core::{OrgId, TenantId};
use warden_store::PolicyStore;

use crate::error::PolicyError;
use crate::snapshot::PolicySnapshot;

/// Bounds on the snapshot cache TTL.
const MIN_TTL: Duration = Duration::from_secs(60);
const MAX_TTL: Duration = Duration::from_secs(1800);

/// Loads, merges, and caches effective policy snapshots per (tenant, org).
///
/// Cache keys are `tenant` or `tenant:org`. Entries expire after the
/// configured TTL (clamped to [1 min, 30 min]); concurrent misses for the
/// same key coalesce into a single load via `try_get_with`.
pub struct PolicyRepository {
    store: Arc<dyn PolicyStore>,
    cache: Cache<String, Arc<PolicySnapshot>>,
}

impl PolicyRepository {
    /// Create a repository over `store` with the given cache TTL.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>, ttl: Duration) -> Self {
        let ttl = ttl.clamp(MIN_TTL, MAX_TTL);
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { store, cache }
    }

    fn cache_key(tenant: &TenantId, org: Option<&OrgId>) -> String {
        match org {
            Some(org) => format!("{tenant}:{org}"),
            None => tenant.to_string(),
        }
    }

    /// Return the effective snapshot for (tenant, org), loading on miss.
    ///
    /// A load error is propagated to every coalesced waiter; nothing is
    /// cached on failure, so the next call retries the store.
    pub async fn snapshot(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Arc<PolicySnapshot>, PolicyError> {
        let key = Self::cache_key(tenant, org);
        let store = Arc::clone(&self.store);
        let tenant = tenant.clone();
        let org = org.cloned();

        self.cache
            .try_get_with(key, async move {
                let rows = store
                    .load_policies(&tenant, org.as_ref())
                    .await
                    .map_err(|e| PolicyError::Load(e.to_string()))?;
                let snapshot = PolicySnapshot::build(rows, Utc::now())?;
                debug!(
                    tenant = %tenant,
                    policies = snapshot.len(),
                    "policy snapshot loaded"
                );
                Ok(Arc::new(snapshot))
            })
            .await
            .map_err(|e: Arc<PolicyError>| match &*e {
                PolicyError::Load(msg) => PolicyError::Load(msg.clone()),
                PolicyError::InvalidPattern { id, reason } => PolicyError::InvalidPattern {
                    id: id.clone(),
                    reason: reason.clone(),
                },
            })
    }

    /// Drop the cached snapshot for one (tenant, org) scope. The next
    /// lookup is guaranteed to miss.
    pub async fn invalidate(&self, tenant: &TenantId, org: Option<&OrgId>) {
        self.cache.invalidate(&Self::cache_key(tenant, org)).await;
    }

    /// Drop every cached snapshot.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl std::fmt::Debug for PolicyRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRepository")
            .field("cached_scopes", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use warden_core::{Policy, PolicyAction, PolicyCategory, PolicyOverride, Severity};
    use warden_store::{MemoryStore, StoreError};

    use super::*;

    fn policy(id: &str) -> Policy {
        Policy::new(
            id,
            "Test",
            PolicyCategory::SecuritySqli,
            "x",
            Severity::High,
            PolicyAction::Block,
        )
    }

    /// Store wrapper counting load calls.
    struct CountingStore {
        inner: MemoryStore,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl PolicyStore for CountingStore {
        async fn load_policies(
            &self,
            tenant: &TenantId,
            org: Option<&OrgId>,
        ) -> Result<Vec<(Policy, Option<PolicyOverride>)>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_policies(tenant, org).await
        }
    }

    #[tokio::test]
    async fn snapshot_is_cached() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::with_policies(vec![policy("p1")]),
            loads: AtomicUsize::new(0),
        });
        let repo = PolicyRepository::new(Arc::clone(&store) as _, Duration::from_secs(300));

        let tenant = TenantId::new("tenant-a");
        let first = repo.snapshot(&tenant, None).await.unwrap();
        let second = repo.snapshot(&tenant, None).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_miss() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::with_policies(vec![policy("p1")]),
            loads: AtomicUsize::new(0),
        });
        let repo = PolicyRepository::new(Arc::clone(&store) as _, Duration::from_secs(300));

        let tenant = TenantId::new("tenant-a");
        repo.snapshot(&tenant, None).await.unwrap();
        repo.invalidate(&tenant, None).await;
        repo.snapshot(&tenant, None).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_scopes_load_separately() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::with_policies(vec![policy("p1")]),
            loads: AtomicUsize::new(0),
        });
        let repo = PolicyRepository::new(Arc::clone(&store) as _, Duration::from_secs(300));

        repo.snapshot(&TenantId::new("a"), None).await.unwrap();
        repo.snapshot(&TenantId::new("a"), Some(&OrgId::new("o")))
            .await
            .unwrap();
        repo.snapshot(&TenantId::new("b"), None).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn load_errors_propagate_and_are_not_cached() {
        let inner = MemoryStore::with_policies(vec![policy("p1")]);
        inner.set_available(false);
        let store = Arc::new(CountingStore {
            inner,
            loads: AtomicUsize::new(0),
        });
        let repo = PolicyRepository::new(Arc::clone(&store) as _, Duration::from_secs(300));

        let tenant = TenantId::new("tenant-a");
        let err = repo.snapshot(&tenant, None).await.unwrap_err();
        assert!(matches!(err, PolicyError::Load(_)));

        store.inner.set_available(true);
        assert!(repo.snapshot(&tenant, None).await.is_ok());
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_coalesce() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::with_policies(vec![policy("p1")]),
            loads: AtomicUsize::new(0),
        });
        let repo = Arc::new(PolicyRepository::new(
            Arc::clone(&store) as _,
            Duration::from_secs(300),
        ));

        let tenant = TenantId::new("tenant-a");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            let tenant = tenant.clone();
            handles.push(tokio::spawn(async move {
                repo.snapshot(&tenant, None).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ttl_is_clamped() {
        // A zero TTL would disable caching entirely; the clamp keeps the
        // second lookup a hit.
        let store = Arc::new(CountingStore {
            inner: MemoryStore::with_policies(vec![policy("p1")]),
            loads: AtomicUsize::new(0),
        });
        let repo = PolicyRepository::new(Arc::clone(&store) as _, Duration::ZERO);

        let tenant = TenantId::new("tenant-a");
        repo.snapshot(&tenant, None).await.unwrap();
        repo.snapshot(&tenant, None).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }
}
