use utoipa::OpenApi;

use super::schemas::{
    AuditLlmCallRequest, AuditLlmCallResponse, ConnectorStatus, ErrorResponse, McpExecuteRequest,
    McpQueryRequest, PreCheckRequest, PreCheckResponse, ProxyExecuteRequest, ProxyExecuteResponse,
};

/// OpenAPI document for the gateway surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden Gateway API",
        description = "AI-governance gateway: policy pre-checks, LLM call audits, and tenant-scoped connector access."
    ),
    paths(
        super::precheck::pre_check,
        super::audit::audit_llm_call,
        super::proxy::execute,
        super::mcp::query,
        super::mcp::execute,
        super::mcp::list_connectors,
        super::mcp::connector_health,
        super::mcp::aggregate_health,
        super::health::health,
        super::health::metrics,
    ),
    components(schemas(
        PreCheckRequest,
        PreCheckResponse,
        AuditLlmCallRequest,
        AuditLlmCallResponse,
        ProxyExecuteRequest,
        ProxyExecuteResponse,
        McpQueryRequest,
        McpExecuteRequest,
        ConnectorStatus,
        ErrorResponse,
    )),
    tags(
        (name = "Gateway", description = "Pre-check and audit protocol"),
        (name = "Connectors", description = "Tenant-scoped connector access"),
        (name = "Health", description = "Liveness and counters")
    )
)]
pub struct ApiDoc;
