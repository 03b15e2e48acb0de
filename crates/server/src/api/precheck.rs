use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use super::license_key;
use super::schemas::{ErrorResponse, PreCheckRequest, PreCheckResponse};
use crate::context::ServiceContext;
use crate::error::ServerError;

/// `POST /api/policy/pre-check` -- Gateway Mode step 1.
///
/// Authenticates the caller, evaluates the static policy set, optionally
/// fetches the requested data sources, and issues a gateway context that
/// the paired audit call must present.
#[utoipa::path(
    post,
    path = "/api/policy/pre-check",
    tag = "Gateway",
    summary = "Pre-check a request",
    request_body(content = PreCheckRequest, description = "The request to check"),
    responses(
        (status = 200, description = "Verdict issued (approved or blocked)", body = PreCheckResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 403, description = "Tenant mismatch or disabled client", body = ErrorResponse),
        (status = 503, description = "Policy store unavailable", body = ErrorResponse)
    )
)]
pub async fn pre_check(
    State(state): State<ServiceContext>,
    headers: HeaderMap,
    Json(req): Json<PreCheckRequest>,
) -> Result<Json<PreCheckResponse>, ServerError> {
    let response = state.pre_check(req, license_key(&headers)).await?;
    Ok(Json(response))
}
