use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use warden_auth::LicenseClaims;
use warden_core::Client;

use super::license_key;
use super::schemas::{ConnectorStatus, ErrorResponse, McpExecuteRequest, McpQueryRequest};
use crate::context::ServiceContext;
use crate::error::ServerError;

/// Authenticate an MCP call and resolve its effective service
/// permissions.
async fn authenticate(
    state: &ServiceContext,
    headers: &HeaderMap,
    client_id: &str,
    user_token: &str,
) -> Result<(Client, Option<LicenseClaims>), ServerError> {
    if client_id.is_empty() {
        return Err(ServerError::Validation("client_id field is required".into()));
    }
    let (client, claims) = state
        .authenticate_client(client_id, license_key(headers))
        .await?;
    state.authenticate_user(user_token, &client)?;

    if let Some(ref limiter) = state.rate_limiter {
        let bucket = format!("client:{}", client.id);
        if let Err(e) = limiter.check(&bucket, u64::from(client.rate_limit)) {
            state.metrics.increment_rate_limited();
            return Err(ServerError::RateLimited {
                retry_after: e.retry_after,
            });
        }
    }

    Ok((client, claims))
}

fn service_permissions(claims: Option<&LicenseClaims>) -> Option<&[String]> {
    claims
        .filter(|c| c.is_service_identity())
        .map(|c| c.permissions.as_slice())
}

/// `POST /mcp/resources/query` -- authenticated connector read.
#[utoipa::path(
    post,
    path = "/mcp/resources/query",
    tag = "Connectors",
    summary = "Query a connector",
    request_body(content = McpQueryRequest, description = "The read query"),
    responses(
        (status = 200, description = "Query result"),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 403, description = "Tenant not granted access", body = ErrorResponse),
        (status = 404, description = "Unknown connector", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn query(
    State(state): State<ServiceContext>,
    headers: HeaderMap,
    Json(req): Json<McpQueryRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let (client, claims) = authenticate(&state, &headers, &req.client_id, &req.user_token).await?;

    let connector = state.connectors.validate_tenant_access(
        &req.connector,
        &client.tenant_id,
        service_permissions(claims.as_ref()),
    )?;
    let result = connector
        .query(&req.query)
        .await
        .map_err(ServerError::from)?;
    Ok(Json(result))
}

/// `POST /mcp/tools/execute` -- authenticated connector write.
#[utoipa::path(
    post,
    path = "/mcp/tools/execute",
    tag = "Connectors",
    summary = "Execute through a connector",
    request_body(content = McpExecuteRequest, description = "The write command"),
    responses(
        (status = 200, description = "Execution result"),
        (status = 401, description = "Authentication failed", body = ErrorResponse),
        (status = 403, description = "Tenant not granted access", body = ErrorResponse),
        (status = 404, description = "Unknown connector", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    )
)]
pub async fn execute(
    State(state): State<ServiceContext>,
    headers: HeaderMap,
    Json(req): Json<McpExecuteRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let (client, claims) = authenticate(&state, &headers, &req.client_id, &req.user_token).await?;

    let connector = state.connectors.validate_tenant_access(
        &req.connector,
        &client.tenant_id,
        service_permissions(claims.as_ref()),
    )?;
    let result = connector
        .execute(&req.command)
        .await
        .map_err(ServerError::from)?;
    Ok(Json(result))
}

/// `GET /mcp/connectors` -- list connectors with health.
#[utoipa::path(
    get,
    path = "/mcp/connectors",
    tag = "Connectors",
    summary = "List connectors",
    responses(
        (status = 200, description = "Connector statuses", body = [ConnectorStatus])
    )
)]
pub async fn list_connectors(
    State(state): State<ServiceContext>,
) -> Json<Vec<ConnectorStatus>> {
    let statuses = state
        .connectors
        .health_check(state.settings.health_deadline)
        .await;
    let body = statuses
        .into_iter()
        .map(|(name, health)| ConnectorStatus {
            name,
            healthy: health.healthy,
            error: health.error,
            latency_ms: health.latency_ms,
        })
        .collect();
    Json(body)
}

/// `GET /mcp/connectors/{name}/health` -- single connector health.
#[utoipa::path(
    get,
    path = "/mcp/connectors/{name}/health",
    tag = "Connectors",
    summary = "Check one connector",
    params(("name" = String, Path, description = "Connector name")),
    responses(
        (status = 200, description = "Connector status", body = ConnectorStatus),
        (status = 404, description = "Unknown connector", body = ErrorResponse)
    )
)]
pub async fn connector_health(
    State(state): State<ServiceContext>,
    Path(name): Path<String>,
) -> Result<Json<ConnectorStatus>, ServerError> {
    let health = state
        .connectors
        .health_check_single(&name, state.settings.health_deadline)
        .await?;
    Ok(Json(ConnectorStatus {
        name,
        healthy: health.healthy,
        error: health.error,
        latency_ms: health.latency_ms,
    }))
}

/// `GET /mcp/health` -- aggregate connector health.
#[utoipa::path(
    get,
    path = "/mcp/health",
    tag = "Connectors",
    summary = "Aggregate connector health",
    responses((status = 200, description = "Aggregate status"))
)]
pub async fn aggregate_health(State(state): State<ServiceContext>) -> Json<serde_json::Value> {
    let statuses = state
        .connectors
        .health_check(state.settings.health_deadline)
        .await;
    let healthy = statuses.values().filter(|h| h.healthy).count();
    let total = statuses.len();
    let status = if healthy == total { "ok" } else { "degraded" };

    Json(serde_json::json!({
        "status": status,
        "connectors": total,
        "healthy": healthy,
    }))
}
