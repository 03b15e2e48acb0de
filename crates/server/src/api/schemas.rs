use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use warden_core::TokenUsage;

use crate::ratelimit::RateLimitInfo;

/// Standard error body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Gateway Mode step 1 input.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PreCheckRequest {
    /// End-user token. May be empty in community mode.
    #[serde(default)]
    pub user_token: String,
    /// The calling client's id.
    #[serde(default)]
    pub client_id: String,
    /// Data sources to fetch through the connector registry on approval.
    #[serde(default)]
    pub data_sources: Vec<String>,
    /// The input to check.
    #[serde(default)]
    pub query: String,
    /// Request type from the closed set. Defaults to `llm_chat`.
    pub request_type: Option<String>,
    /// Opaque caller context, echoed into audit metadata.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: Option<serde_json::Value>,
}

/// Gateway Mode step 1 output.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreCheckResponse {
    /// The receipt the paired audit must present.
    pub context_id: String,
    /// Whether the request may proceed.
    pub approved: bool,
    /// Connector fetch results by source name, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub approved_data: Option<BTreeMap<String, serde_json::Value>>,
    /// Ids of the policies that triggered, in evaluation order.
    pub policies: Vec<String>,
    /// Rate limit accounting, when the limiter is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
    /// When the context stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Why the request was blocked. Empty when approved.
    #[serde(default)]
    pub block_reason: String,
}

/// Gateway Mode step 2 input.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuditLlmCallRequest {
    /// The context issued by the pre-check.
    #[serde(default)]
    pub context_id: String,
    /// The calling client's id.
    #[serde(default)]
    pub client_id: String,
    /// Short summary of the LLM response, for the audit record.
    #[serde(default)]
    pub response_summary: String,
    /// Provider that served the call.
    #[serde(default)]
    pub provider: String,
    /// Model that served the call.
    #[serde(default)]
    pub model: String,
    /// Token accounting.
    #[serde(default)]
    pub token_usage: TokenUsage,
    /// End-to-end latency in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
    /// Caller-supplied metadata.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

/// Gateway Mode step 2 output.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLlmCallResponse {
    /// Always `true`; audit failures never fail the client.
    pub success: bool,
    /// The id of the recorded audit.
    pub audit_id: String,
}

/// Proxy Mode input.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProxyExecuteRequest {
    /// End-user token.
    #[serde(default)]
    pub user_token: String,
    /// The calling client's id.
    #[serde(default)]
    pub client_id: String,
    /// The input to check and forward.
    #[serde(default)]
    pub query: String,
    /// Request type from the closed set. Defaults to `llm_chat`.
    pub request_type: Option<String>,
}

/// Proxy Mode output.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProxyExecuteResponse {
    /// The context issued by the internal pre-check.
    pub context_id: String,
    /// Whether the request was approved and forwarded.
    pub approved: bool,
    /// Why the request was blocked. Empty when approved.
    #[serde(default)]
    pub block_reason: String,
    /// The downstream response content, when approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The id of the recorded audit, when approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
}

/// Authenticated connector read.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct McpQueryRequest {
    /// End-user token.
    #[serde(default)]
    pub user_token: String,
    /// The calling client's id.
    #[serde(default)]
    pub client_id: String,
    /// Target connector name.
    #[serde(default)]
    pub connector: String,
    /// The read query.
    #[serde(default)]
    pub query: String,
}

/// Authenticated connector write.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct McpExecuteRequest {
    /// End-user token.
    #[serde(default)]
    pub user_token: String,
    /// The calling client's id.
    #[serde(default)]
    pub client_id: String,
    /// Target connector name.
    #[serde(default)]
    pub connector: String,
    /// The write command.
    #[serde(default)]
    pub command: String,
}

/// Connector listing entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectorStatus {
    /// Connector name.
    pub name: String,
    /// Whether the last health check succeeded.
    pub healthy: bool,
    /// Failure message, when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Health check latency in milliseconds.
    pub latency_ms: u64,
}
