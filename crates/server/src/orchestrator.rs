use async_trait::async_trait;

use warden_core::{ResponseBody, TokenUsage};

use crate::error::ServerError;

/// What the downstream orchestrator returns for one completed call.
#[derive(Debug, Clone)]
pub struct OrchestratorResponse {
    /// The response body.
    pub body: ResponseBody,
    /// Provider that served the call.
    pub provider: String,
    /// Model that served the call.
    pub model: String,
    /// Token accounting for the call.
    pub token_usage: TokenUsage,
    /// End-to-end latency in milliseconds.
    pub latency_ms: u64,
}

/// The downstream LLM orchestrator used by Proxy Mode.
///
/// The implementation lives outside this system; the gateway only
/// forwards approved queries and audits the result.
#[async_trait]
pub trait LlmOrchestrator: Send + Sync {
    /// Forward an approved query and return the completed call.
    async fn complete(&self, query: &str) -> Result<OrchestratorResponse, ServerError>;
}
