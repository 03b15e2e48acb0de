use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::GatewayContext;
use crate::types::{ClientId, ContextId};

/// Token counts reported for an LLM call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt: u64,
    /// Tokens in the completion.
    pub completion: u64,
    /// Total tokens billed.
    pub total: u64,
}

/// An immutable audit record of one LLM call reported after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LlmCallAudit {
    /// Unique audit identifier (UUID v4).
    pub audit_id: String,

    /// The gateway context this call was pre-checked under.
    pub context_id: ContextId,

    /// Client that made the call.
    pub client_id: ClientId,

    /// Provider name (e.g. `"openai"`).
    pub provider: String,

    /// Model name (e.g. `"gpt-4o"`).
    pub model: String,

    /// Reported token counts.
    pub token_usage: TokenUsage,

    /// End-to-end call latency in milliseconds.
    pub latency_ms: u64,

    /// Estimated cost in USD from the pricing table.
    pub estimated_cost_usd: f64,

    /// Caller-supplied metadata.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: serde_json::Value,

    /// When the audit record was created.
    pub created_at: DateTime<Utc>,
}

impl LlmCallAudit {
    /// Create a new audit record with a fresh UUID and `created_at = now`.
    #[must_use]
    pub fn new(
        context_id: ContextId,
        client_id: ClientId,
        provider: impl Into<String>,
        model: impl Into<String>,
        token_usage: TokenUsage,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4().to_string(),
            context_id,
            client_id,
            provider: provider.into(),
            model: model.into(),
            token_usage,
            latency_ms: 0,
            estimated_cost_usd: 0.0,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }
}

/// The typed payload carried by an [`AuditEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum AuditEntryKind {
    /// A gateway pre-check context.
    GatewayContext(GatewayContext),
    /// A post-hoc LLM call audit.
    LlmCallAudit(LlmCallAudit),
}

impl AuditEntryKind {
    /// The wire name of this entry kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GatewayContext(_) => "gateway_context",
            Self::LlmCallAudit(_) => "llm_call_audit",
        }
    }
}

/// One element of the durable audit queue.
///
/// Serializes to a single JSON object so the fallback file can hold one
/// entry per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The typed record.
    #[serde(flatten)]
    pub kind: AuditEntryKind,

    /// When the entry was accepted by a handler.
    pub timestamp: DateTime<Utc>,

    /// Client the entry belongs to.
    pub client_id: ClientId,
}

impl AuditEntry {
    /// Wrap a gateway context, timestamped now.
    #[must_use]
    pub fn gateway_context(ctx: GatewayContext) -> Self {
        let client_id = ctx.client_id.clone();
        Self {
            kind: AuditEntryKind::GatewayContext(ctx),
            timestamp: Utc::now(),
            client_id,
        }
    }

    /// Wrap an LLM call audit, timestamped now.
    #[must_use]
    pub fn llm_call(audit: LlmCallAudit) -> Self {
        let client_id = audit.client_id.clone();
        Self {
            kind: AuditEntryKind::LlmCallAudit(audit),
            timestamp: Utc::now(),
            client_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_wire_names() {
        let ctx = GatewayContext::new(ClientId::new("c1"), chrono::Duration::minutes(5));
        let entry = AuditEntry::gateway_context(ctx);
        assert_eq!(entry.kind.name(), "gateway_context");

        let audit = LlmCallAudit::new(
            ContextId::new("ctx-1"),
            ClientId::new("c1"),
            "openai",
            "gpt-4o",
            TokenUsage::default(),
        );
        let entry = AuditEntry::llm_call(audit);
        assert_eq!(entry.kind.name(), "llm_call_audit");
    }

    #[test]
    fn entry_serializes_with_type_tag() {
        let ctx = GatewayContext::new(ClientId::new("c1"), chrono::Duration::minutes(5));
        let entry = AuditEntry::gateway_context(ctx);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "gateway_context");
        assert!(value["details"].is_object());
        assert_eq!(value["client_id"], "c1");
    }

    #[test]
    fn entry_serde_roundtrip() {
        let audit = LlmCallAudit::new(
            ContextId::new("ctx-1"),
            ClientId::new("c1"),
            "anthropic",
            "claude-sonnet",
            TokenUsage {
                prompt: 100,
                completion: 50,
                total: 150,
            },
        );
        let entry = AuditEntry::llm_call(audit);
        let line = serde_json::to_string(&entry).unwrap();
        assert!(!line.contains('\n'));
        let back: AuditEntry = serde_json::from_str(&line).unwrap();
        match back.kind {
            AuditEntryKind::LlmCallAudit(a) => {
                assert_eq!(a.provider, "anthropic");
                assert_eq!(a.token_usage.total, 150);
            }
            AuditEntryKind::GatewayContext(_) => panic!("wrong kind"),
        }
    }
}
