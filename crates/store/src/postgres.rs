//! Postgres backend using `sqlx`.
//!
//! All tables are namespaced by a configurable prefix and created by
//! idempotent migrations at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_core::{
    Client, ClientId, ContextId, GatewayContext, OrgId, Policy, PolicyAction, PolicyCategory,
    PolicyOverride, PolicyTier, Severity, TenantId,
};

use crate::error::StoreError;
use crate::store::{ClientRecord, ClientStore, ContextStore, PolicyStore};

/// Postgres-backed implementation of every store trait.
pub struct PostgresStore {
    pool: PgPool,
    prefix: String,
}

impl PostgresStore {
    /// Connect to Postgres and run migrations.
    pub async fn new(url: &str, prefix: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_pool(pool, prefix).await
    }

    /// Create from an existing pool (useful for testing and for sharing the
    /// pool with the audit writer).
    pub async fn from_pool(pool: PgPool, prefix: &str) -> Result<Self, StoreError> {
        run_migrations(&pool, prefix)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            pool,
            prefix: prefix.to_owned(),
        })
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

/// Parse a TEXT column into a serde-decodable enum.
fn parse_enum<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(raw.to_owned()))
        .map_err(|e| StoreError::Serialization(format!("column {column}: {e}")))
}

/// Encode a serde-encodable enum into its TEXT column form.
fn enum_text<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[derive(sqlx::FromRow)]
struct PolicyJoinRow {
    policy_id: String,
    name: String,
    category: String,
    pattern: String,
    severity: String,
    action: String,
    tier: String,
    priority: i32,
    enabled: bool,
    organization_id: Option<String>,
    tenant_id: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    o_action_override: Option<String>,
    o_enabled_override: Option<bool>,
    o_tenant_id: Option<String>,
    o_organization_id: Option<String>,
    o_expires_at: Option<DateTime<Utc>>,
    o_reason: Option<String>,
    o_present: bool,
}

impl PolicyJoinRow {
    fn into_pair(self) -> Result<(Policy, Option<PolicyOverride>), StoreError> {
        #[allow(clippy::cast_sign_loss)]
        let policy = Policy {
            policy_id: self.policy_id.clone().into(),
            name: self.name,
            category: parse_enum::<PolicyCategory>("category", &self.category)?,
            pattern: self.pattern,
            severity: parse_enum::<Severity>("severity", &self.severity)?,
            action: parse_enum::<PolicyAction>("action", &self.action)?,
            tier: parse_enum::<PolicyTier>("tier", &self.tier)?,
            priority: self.priority,
            enabled: self.enabled,
            organization_id: self.organization_id.map(OrgId::from),
            tenant_id: self.tenant_id.map(TenantId::from),
            version: self.version as u64,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        let ov = if self.o_present {
            Some(PolicyOverride {
                policy_id: self.policy_id.into(),
                tenant_id: self.o_tenant_id.map(TenantId::from),
                organization_id: self.o_organization_id.map(OrgId::from),
                action_override: self
                    .o_action_override
                    .map(|a| parse_enum::<PolicyAction>("action_override", &a))
                    .transpose()?,
                enabled_override: self.o_enabled_override,
                expires_at: self.o_expires_at,
                reason: self.o_reason,
            })
        } else {
            None
        };

        Ok((policy, ov))
    }
}

#[async_trait]
impl PolicyStore for PostgresStore {
    async fn load_policies(
        &self,
        tenant: &TenantId,
        org: Option<&OrgId>,
    ) -> Result<Vec<(Policy, Option<PolicyOverride>)>, StoreError> {
        // One query materialises every applicable row plus the single most
        // specific live override per policy.
        let sql = format!(
            r"
            SELECT
                p.policy_id, p.name, p.category, p.pattern, p.severity,
                p.action, p.tier, p.priority, p.enabled,
                p.organization_id, p.tenant_id, p.version,
                p.created_at, p.updated_at,
                o.action_override   AS o_action_override,
                o.enabled_override  AS o_enabled_override,
                o.tenant_id         AS o_tenant_id,
                o.organization_id   AS o_organization_id,
                o.expires_at        AS o_expires_at,
                o.reason            AS o_reason,
                (o.policy_id IS NOT NULL) AS o_present
            FROM {policies} p
            LEFT JOIN LATERAL (
                SELECT * FROM {overrides} o
                WHERE o.policy_id = p.policy_id
                  AND (o.tenant_id IS NULL OR o.tenant_id = $1)
                  AND (o.organization_id IS NULL OR o.organization_id = $2)
                  AND (o.expires_at IS NULL OR o.expires_at > NOW())
                ORDER BY (o.tenant_id IS NOT NULL)::int * 2
                       + (o.organization_id IS NOT NULL)::int DESC
                LIMIT 1
            ) o ON TRUE
            WHERE p.tier = 'system'
               OR (p.tier = 'organization' AND p.organization_id = $2)
               OR (p.tier = 'tenant' AND p.tenant_id = $1)
            ",
            policies = self.table("static_policies"),
            overrides = self.table("policy_overrides"),
        );

        let rows = sqlx::query_as::<_, PolicyJoinRow>(&sql)
            .bind(tenant.as_str())
            .bind(org.map(OrgId::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        rows.into_iter().map(PolicyJoinRow::into_pair).collect()
    }
}

impl PostgresStore {
    /// Insert or update a policy row. Used for seeding and administration.
    pub async fn upsert_policy(&self, policy: &Policy) -> Result<(), StoreError> {
        let sql = format!(
            r"
            INSERT INTO {} (
                policy_id, name, category, pattern, severity, action, tier,
                priority, enabled, organization_id, tenant_id, version,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (policy_id) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                pattern = EXCLUDED.pattern,
                severity = EXCLUDED.severity,
                action = EXCLUDED.action,
                tier = EXCLUDED.tier,
                priority = EXCLUDED.priority,
                enabled = EXCLUDED.enabled,
                organization_id = EXCLUDED.organization_id,
                tenant_id = EXCLUDED.tenant_id,
                version = EXCLUDED.version,
                updated_at = EXCLUDED.updated_at
            ",
            self.table("static_policies"),
        );

        #[allow(clippy::cast_possible_wrap)]
        let version = policy.version as i64;

        sqlx::query(&sql)
            .bind(policy.policy_id.as_str())
            .bind(&policy.name)
            .bind(enum_text(&policy.category))
            .bind(&policy.pattern)
            .bind(enum_text(&policy.severity))
            .bind(enum_text(&policy.action))
            .bind(enum_text(&policy.tier))
            .bind(policy.priority)
            .bind(policy.enabled)
            .bind(policy.organization_id.as_ref().map(OrgId::as_str))
            .bind(policy.tenant_id.as_ref().map(TenantId::as_str))
            .bind(version)
            .bind(policy.created_at)
            .bind(policy.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    /// Return the number of policy rows, for seed-once checks.
    pub async fn policy_count(&self) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table("static_policies"));
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        #[allow(clippy::cast_sign_loss)]
        Ok(count as u64)
    }
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    context_id: String,
    client_id: String,
    user_token_hash: String,
    query_hash: String,
    data_sources: serde_json::Value,
    policies_evaluated: serde_json::Value,
    approved: bool,
    block_reason: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl ContextRow {
    fn into_context(self) -> Result<GatewayContext, StoreError> {
        Ok(GatewayContext {
            context_id: ContextId::from(self.context_id),
            client_id: ClientId::from(self.client_id),
            user_token_hash: self.user_token_hash,
            query_hash: self.query_hash,
            data_sources: serde_json::from_value(self.data_sources)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            policies_evaluated: serde_json::from_value(self.policies_evaluated)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            approved: self.approved,
            block_reason: self.block_reason,
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

#[async_trait]
impl ContextStore for PostgresStore {
    async fn put_context(&self, ctx: &GatewayContext) -> Result<(), StoreError> {
        let sql = format!(
            r"
            INSERT INTO {} (
                context_id, client_id, user_token_hash, query_hash,
                data_sources, policies_evaluated, approved, block_reason,
                created_at, expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
            self.table("gateway_contexts"),
        );

        sqlx::query(&sql)
            .bind(ctx.context_id.as_str())
            .bind(ctx.client_id.as_str())
            .bind(&ctx.user_token_hash)
            .bind(&ctx.query_hash)
            .bind(serde_json::json!(ctx.data_sources))
            .bind(serde_json::json!(ctx.policies_evaluated))
            .bind(ctx.approved)
            .bind(&ctx.block_reason)
            .bind(ctx.created_at)
            .bind(ctx.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn get_context(&self, id: &ContextId) -> Result<Option<GatewayContext>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} WHERE context_id = $1",
            self.table("gateway_contexts"),
        );

        let row = sqlx::query_as::<_, ContextRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(ContextRow::into_context).transpose()
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE expires_at <= NOW()",
            self.table("gateway_contexts"),
        );
        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: String,
    org_id: String,
    tenant_id: String,
    rate_limit: i32,
    license_tier: String,
    license_expiry: Option<DateTime<Utc>>,
    enabled: bool,
    service_name: Option<String>,
    license_key_hash: String,
}

#[async_trait]
impl ClientStore for PostgresStore {
    async fn get_client(&self, id: &ClientId) -> Result<Option<ClientRecord>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table("clients"));

        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(|r| {
            #[allow(clippy::cast_sign_loss)]
            let rate_limit = r.rate_limit.max(0) as u32;
            ClientRecord {
                client: Client {
                    id: ClientId::from(r.id),
                    org_id: OrgId::from(r.org_id),
                    tenant_id: TenantId::from(r.tenant_id),
                    rate_limit,
                    license_tier: r.license_tier,
                    license_expiry: r.license_expiry,
                    enabled: r.enabled,
                    service_name: r.service_name,
                },
                license_key_hash: r.license_key_hash,
            }
        }))
    }
}

/// Create the gateway tables and indexes if they do not already exist.
pub async fn run_migrations(pool: &PgPool, prefix: &str) -> Result<(), sqlx::Error> {
    let statements = [
        format!(
            "
            CREATE TABLE IF NOT EXISTS {prefix}static_policies (
                policy_id       TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                category        TEXT NOT NULL,
                pattern         TEXT NOT NULL,
                severity        TEXT NOT NULL,
                action          TEXT NOT NULL,
                tier            TEXT NOT NULL,
                priority        INT NOT NULL DEFAULT 0,
                enabled         BOOLEAN NOT NULL DEFAULT TRUE,
                organization_id TEXT,
                tenant_id       TEXT,
                version         BIGINT NOT NULL DEFAULT 0,
                created_at      TIMESTAMPTZ NOT NULL,
                updated_at      TIMESTAMPTZ NOT NULL
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS {prefix}policy_overrides (
                policy_id       TEXT NOT NULL,
                tenant_id       TEXT,
                organization_id TEXT,
                action_override TEXT,
                enabled_override BOOLEAN,
                expires_at      TIMESTAMPTZ,
                reason          TEXT
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS {prefix}gateway_contexts (
                context_id         TEXT PRIMARY KEY,
                client_id          TEXT NOT NULL,
                user_token_hash    TEXT NOT NULL,
                query_hash         TEXT NOT NULL,
                data_sources       JSONB NOT NULL DEFAULT '[]'::jsonb,
                policies_evaluated JSONB NOT NULL DEFAULT '[]'::jsonb,
                approved           BOOLEAN NOT NULL,
                block_reason       TEXT NOT NULL DEFAULT '',
                created_at         TIMESTAMPTZ NOT NULL,
                expires_at         TIMESTAMPTZ NOT NULL
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS {prefix}clients (
                id               TEXT PRIMARY KEY,
                org_id           TEXT NOT NULL,
                tenant_id        TEXT NOT NULL,
                rate_limit       INT NOT NULL DEFAULT 60,
                license_tier     TEXT NOT NULL,
                license_expiry   TIMESTAMPTZ,
                enabled          BOOLEAN NOT NULL DEFAULT TRUE,
                service_name     TEXT,
                license_key_hash TEXT NOT NULL
            )
            "
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{prefix}overrides_scope
             ON {prefix}policy_overrides (policy_id, COALESCE(tenant_id, ''), COALESCE(organization_id, ''))"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}policies_tier
             ON {prefix}static_policies (tier, enabled)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}contexts_client
             ON {prefix}gateway_contexts (client_id, created_at DESC)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}contexts_expires
             ON {prefix}gateway_contexts (expires_at)"
        ),
    ];

    for stmt in &statements {
        sqlx::query(stmt).execute(pool).await?;
    }

    Ok(())
}
