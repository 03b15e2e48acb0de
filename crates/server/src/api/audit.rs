use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use super::license_key;
use super::schemas::{AuditLlmCallRequest, AuditLlmCallResponse, ErrorResponse};
use crate::context::ServiceContext;
use crate::error::ServerError;

/// `POST /api/audit/llm-call` -- Gateway Mode step 2.
///
/// Verifies the context issued by the pre-check and records the LLM call
/// durably. Audit-pipeline failures never degrade the response status;
/// only a queue-and-fallback double failure surfaces as 503.
#[utoipa::path(
    post,
    path = "/api/audit/llm-call",
    tag = "Gateway",
    summary = "Audit an LLM call",
    request_body(content = AuditLlmCallRequest, description = "The completed call to record"),
    responses(
        (status = 200, description = "Audit recorded", body = AuditLlmCallResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 403, description = "Context expired or not owned by this client", body = ErrorResponse),
        (status = 404, description = "Unknown context", body = ErrorResponse),
        (status = 503, description = "Audit pipeline unavailable", body = ErrorResponse)
    )
)]
pub async fn audit_llm_call(
    State(state): State<ServiceContext>,
    headers: HeaderMap,
    Json(req): Json<AuditLlmCallRequest>,
) -> Result<Json<AuditLlmCallResponse>, ServerError> {
    let response = state.record_llm_call(req, license_key(&headers)).await?;
    Ok(Json(response))
}
