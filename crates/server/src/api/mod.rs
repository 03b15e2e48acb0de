pub mod audit;
pub mod health;
pub mod mcp;
pub mod openapi;
pub mod precheck;
pub mod proxy;
pub mod schemas;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::ServiceContext;

use self::openapi::ApiDoc;

/// Name of the client license header.
///
/// Required unless the deployment runs in community mode. Keys in the
/// retired v1 format (`wl1.` prefix) are rejected with 401; there is no
/// fallback parser for them.
pub const LICENSE_HEADER: &str = "x-license-key";

/// Extract the license key header, if present.
#[must_use]
pub fn license_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(LICENSE_HEADER).and_then(|v| v.to_str().ok())
}

/// Build the axum router with all routes and middleware.
pub fn router(state: ServiceContext) -> Router {
    let proxy_enabled = state.orchestrator.is_some();

    let mut app = Router::new()
        // Gateway protocol
        .route("/api/policy/pre-check", post(precheck::pre_check))
        .route("/api/audit/llm-call", post(audit::audit_llm_call))
        // Authenticated connector surface
        .route("/mcp/resources/query", post(mcp::query))
        .route("/mcp/tools/execute", post(mcp::execute))
        .route("/mcp/connectors", get(mcp::list_connectors))
        .route("/mcp/connectors/{name}/health", get(mcp::connector_health))
        .route("/mcp/health", get(mcp::aggregate_health))
        // Liveness & metrics
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics));

    if proxy_enabled {
        app = app.route("/api/proxy/execute", post(proxy::execute));
    }

    app.with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
