use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use super::license_key;
use super::schemas::{ErrorResponse, ProxyExecuteRequest, ProxyExecuteResponse};
use crate::context::ServiceContext;
use crate::error::ServerError;

/// `POST /api/proxy/execute` -- Proxy Mode single-shot path.
///
/// Runs the pre-check, forwards the approved query through the
/// configured orchestrator, and records the audit in one round trip.
/// Only routed when an orchestrator is configured.
#[utoipa::path(
    post,
    path = "/api/proxy/execute",
    tag = "Gateway",
    summary = "Proxy an LLM call",
    request_body(content = ProxyExecuteRequest, description = "The request to check and forward"),
    responses(
        (status = 200, description = "Verdict and, when approved, the downstream content", body = ProxyExecuteResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 503, description = "Policy store unavailable", body = ErrorResponse)
    )
)]
pub async fn execute(
    State(state): State<ServiceContext>,
    headers: HeaderMap,
    Json(req): Json<ProxyExecuteRequest>,
) -> Result<Json<ProxyExecuteResponse>, ServerError> {
    let response = state.proxy_execute(req, license_key(&headers)).await?;
    Ok(Json(response))
}
