use axum::Json;
use axum::extract::State;

use crate::context::ServiceContext;

/// `GET /health` -- liveness probe with a metrics snapshot.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Liveness",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<ServiceContext>) -> Json<serde_json::Value> {
    let snap = state.metrics.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "metrics": snap,
    }))
}

/// `GET /metrics` -- request and audit-queue counters as JSON.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    summary = "Counters",
    responses((status = 200, description = "Counter snapshot"))
)]
pub async fn metrics(State(state): State<ServiceContext>) -> Json<serde_json::Value> {
    let server = state.metrics.snapshot();
    let queue = state.audit.metrics();
    Json(serde_json::json!({
        "pre_checks_total": server.pre_checks,
        "pre_checks_approved_total": server.approved,
        "pre_checks_blocked_total": server.blocked,
        "audits_recorded_total": server.audits_recorded,
        "rate_limited_total": server.rate_limited,
        "kill_switch_blocks_total": server.kill_switch_blocks,
        "audit_enqueued_total": queue.enqueued,
        "audit_persisted_total": queue.persisted,
        "audit_fallback_total": queue.fallback,
        "audit_dropped_total": queue.dropped_oldest,
        "audit_retries_total": queue.retries,
        "audit_rejected_total": queue.rejected,
    }))
}
