//! Postgres audit writer.
//!
//! Each batch becomes one multi-row insert per entry kind. Gateway
//! contexts upsert into the contexts table (`ON CONFLICT DO NOTHING`, the
//! pre-check usually persisted them synchronously already); LLM call
//! audits insert into their own table.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

use warden_core::{AuditEntry, AuditEntryKind, GatewayContext, LlmCallAudit};

use crate::error::AuditError;
use crate::writer::AuditWriter;

/// Postgres-backed [`AuditWriter`] using `sqlx`.
pub struct PostgresAuditWriter {
    pool: PgPool,
    prefix: String,
}

impl PostgresAuditWriter {
    /// Create a writer over an existing pool, running the audit-table
    /// migration. The contexts table is expected to be migrated by the
    /// store that shares this pool.
    pub async fn new(pool: PgPool, prefix: &str) -> Result<Self, AuditError> {
        run_migrations(&pool, prefix)
            .await
            .map_err(|e| AuditError::Writer(e.to_string()))?;
        Ok(Self {
            pool,
            prefix: prefix.to_owned(),
        })
    }
}

#[async_trait]
impl AuditWriter for PostgresAuditWriter {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<(), AuditError> {
        let mut contexts: Vec<&GatewayContext> = Vec::new();
        let mut calls: Vec<&LlmCallAudit> = Vec::new();
        for entry in entries {
            match &entry.kind {
                AuditEntryKind::GatewayContext(ctx) => contexts.push(ctx),
                AuditEntryKind::LlmCallAudit(audit) => calls.push(audit),
            }
        }

        if !contexts.is_empty() {
            self.insert_contexts(&contexts).await?;
        }
        if !calls.is_empty() {
            self.insert_calls(&calls).await?;
        }
        Ok(())
    }
}

impl PostgresAuditWriter {
    async fn insert_contexts(&self, contexts: &[&GatewayContext]) -> Result<(), AuditError> {
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {}gateway_contexts (
                context_id, client_id, user_token_hash, query_hash,
                data_sources, policies_evaluated, approved, block_reason,
                created_at, expires_at
            ) ",
            self.prefix
        ));

        builder.push_values(contexts, |mut b, ctx| {
            b.push_bind(ctx.context_id.as_str())
                .push_bind(ctx.client_id.as_str())
                .push_bind(&ctx.user_token_hash)
                .push_bind(&ctx.query_hash)
                .push_bind(serde_json::json!(ctx.data_sources))
                .push_bind(serde_json::json!(ctx.policies_evaluated))
                .push_bind(ctx.approved)
                .push_bind(&ctx.block_reason)
                .push_bind(ctx.created_at)
                .push_bind(ctx.expires_at);
        });
        builder.push(" ON CONFLICT (context_id) DO NOTHING");

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::Writer(e.to_string()))?;
        Ok(())
    }

    async fn insert_calls(&self, calls: &[&LlmCallAudit]) -> Result<(), AuditError> {
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {}llm_call_audits (
                audit_id, context_id, client_id, provider, model,
                prompt_tokens, completion_tokens, total_tokens,
                latency_ms, estimated_cost_usd, metadata, created_at
            ) ",
            self.prefix
        ));

        builder.push_values(calls, |mut b, call| {
            #[allow(clippy::cast_possible_wrap)]
            {
                b.push_bind(&call.audit_id)
                    .push_bind(call.context_id.as_str())
                    .push_bind(call.client_id.as_str())
                    .push_bind(&call.provider)
                    .push_bind(&call.model)
                    .push_bind(call.token_usage.prompt as i64)
                    .push_bind(call.token_usage.completion as i64)
                    .push_bind(call.token_usage.total as i64)
                    .push_bind(call.latency_ms as i64)
                    .push_bind(call.estimated_cost_usd)
                    .push_bind(&call.metadata)
                    .push_bind(call.created_at);
            }
        });

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AuditError::Writer(e.to_string()))?;
        Ok(())
    }
}

/// Create the LLM call audit table and indexes if they do not exist.
pub async fn run_migrations(pool: &PgPool, prefix: &str) -> Result<(), sqlx::Error> {
    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {prefix}llm_call_audits (
            audit_id           TEXT PRIMARY KEY,
            context_id         TEXT NOT NULL,
            client_id          TEXT NOT NULL,
            provider           TEXT NOT NULL,
            model              TEXT NOT NULL,
            prompt_tokens      BIGINT NOT NULL DEFAULT 0,
            completion_tokens  BIGINT NOT NULL DEFAULT 0,
            total_tokens       BIGINT NOT NULL DEFAULT 0,
            latency_ms         BIGINT NOT NULL DEFAULT 0,
            estimated_cost_usd DOUBLE PRECISION NOT NULL DEFAULT 0,
            metadata           JSONB NOT NULL DEFAULT 'null'::jsonb,
            created_at         TIMESTAMPTZ NOT NULL
        )
        "
    );
    sqlx::query(&create_table).execute(pool).await?;

    let indexes = [
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}llm_audits_context
             ON {prefix}llm_call_audits (context_id)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}llm_audits_client_time
             ON {prefix}llm_call_audits (client_id, created_at DESC)"
        ),
    ];
    for idx in &indexes {
        sqlx::query(idx).execute(pool).await?;
    }

    Ok(())
}
