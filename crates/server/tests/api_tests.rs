use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use warden_audit::{AuditQueue, AuditQueueConfig, FallbackFile, MemoryAuditWriter, RetryPolicy};
use warden_auth::{
    Authenticator, DeploymentMode, JwtLicenseValidator, LicenseClaims, UserTokenValidator,
    hash_secret,
};
use warden_auth::user::UserClaims;
use warden_connector::{ConnectorEntry, ConnectorRegistry, LogConnector};
use warden_core::{Client, ClientId, GatewayContext, OrgId, TenantId};
use warden_policy::{PolicyEngine, PolicyRepository};
use warden_scanner::{IndiaPiiDetector, RegionalPiiDetector, seed_policies};
use warden_server::api;
use warden_server::{
    LlmOrchestrator, MemoryKillSwitch, OrchestratorResponse, PricingTable, RuntimeSettings,
    ServerMetrics, ServiceContext,
};
use warden_store::{ClientRecord, ContextStore, MemoryStore};

const SECRET: &str = "test-secret";
const RAW_KEY: &str = "raw-key-c1";

static FALLBACK_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TestHarness {
    store: Arc<MemoryStore>,
    writer: Arc<MemoryAuditWriter>,
    fallback_path: PathBuf,
    kill_switch: Arc<MemoryKillSwitch>,
    app: axum::Router,
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.fallback_path);
    }
}

fn stored_client(id: &str, tenant: &str) -> ClientRecord {
    ClientRecord {
        client: Client {
            id: ClientId::new(id),
            org_id: OrgId::new("org-1"),
            tenant_id: TenantId::new(tenant),
            rate_limit: 1000,
            license_tier: "pro".into(),
            license_expiry: None,
            enabled: true,
            service_name: None,
        },
        license_key_hash: hash_secret(RAW_KEY),
    }
}

fn user_token(tenant: &str) -> String {
    let validator = UserTokenValidator::new(SECRET, DeploymentMode::Standard);
    validator
        .issue(&UserClaims {
            sub: "u1".into(),
            email: "u1@example.com".into(),
            role: "analyst".into(),
            tenant_id: tenant.into(),
            permissions: vec!["query".into()],
            exp: Utc::now().timestamp() + 3600,
        })
        .unwrap()
}

struct MockOrchestrator;

#[async_trait::async_trait]
impl LlmOrchestrator for MockOrchestrator {
    async fn complete(
        &self,
        _query: &str,
    ) -> Result<OrchestratorResponse, warden_server::ServerError> {
        Ok(OrchestratorResponse {
            body: warden_core::ResponseBody::Chat {
                choices: vec![warden_core::ChatChoice {
                    content: "mock completion".into(),
                    finish_reason: Some("stop".into()),
                }],
            },
            provider: "openai".into(),
            model: "gpt-4o".into(),
            token_usage: warden_core::TokenUsage {
                prompt: 10,
                completion: 5,
                total: 15,
            },
            latency_ms: 42,
        })
    }
}

async fn harness(mode: DeploymentMode) -> TestHarness {
    let store = Arc::new(MemoryStore::with_policies(seed_policies()));
    store.upsert_client(stored_client("client-1", "tenant-a"));

    let writer = Arc::new(MemoryAuditWriter::new());
    let fallback_path = std::env::temp_dir().join(format!(
        "warden-api-test-{}-{}.ndjson",
        std::process::id(),
        FALLBACK_COUNTER.fetch_add(1, Ordering::SeqCst),
    ));
    let _ = std::fs::remove_file(&fallback_path);
    let fallback = Arc::new(
        FallbackFile::open(&fallback_path, Duration::from_millis(10))
            .await
            .unwrap(),
    );

    let queue = Arc::new(AuditQueue::spawn(
        Arc::clone(&writer) as _,
        fallback,
        AuditQueueConfig {
            capacity: 100,
            batch_size: 10,
            batch_window: Duration::from_millis(10),
            mode: warden_audit::QueueMode::Compliance,
            retry: RetryPolicy {
                base: Duration::from_millis(5),
                max: Duration::from_millis(20),
                multiplier: 2.0,
                max_attempts: 3,
                attempt_timeout: Duration::from_millis(200),
            },
        },
    ));

    let registry = Arc::new(ConnectorRegistry::new());
    registry.register(
        Arc::new(LogConnector::new("postgres-main")),
        &ConnectorEntry::default(),
    );
    registry.register(
        Arc::new(LogConnector::new("restricted")),
        &ConnectorEntry {
            allowed_tenants: vec!["tenant-other".into()],
            ..ConnectorEntry::default()
        },
    );

    let regional: Vec<Arc<dyn RegionalPiiDetector>> =
        vec![Arc::new(IndiaPiiDetector::new().unwrap())];
    let kill_switch = Arc::new(MemoryKillSwitch::new());

    let state = ServiceContext {
        engine: PolicyEngine::new(),
        policies: Arc::new(PolicyRepository::new(
            Arc::clone(&store) as _,
            Duration::from_secs(300),
        )),
        auth: Arc::new(Authenticator::new(
            Arc::clone(&store) as _,
            Arc::new(JwtLicenseValidator::new(SECRET)),
            UserTokenValidator::new(SECRET, mode),
        )),
        connectors: registry,
        audit: queue,
        contexts: Arc::clone(&store) as _,
        kill_switch: Some(Arc::clone(&kill_switch) as _),
        rate_limiter: None,
        regional: Arc::new(regional),
        pricing: PricingTable::new(),
        metrics: Arc::new(ServerMetrics::default()),
        orchestrator: Some(Arc::new(MockOrchestrator)),
        settings: RuntimeSettings::default(),
    };

    TestHarness {
        store,
        writer,
        fallback_path,
        kill_switch,
        app: api::router(state),
    }
}

async fn post_json(
    app: &axum::Router,
    path: &str,
    body: serde_json::Value,
    license: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(http::Method::POST)
        .uri(path)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(key) = license {
        builder = builder.header("x-license-key", key);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get_json(app: &axum::Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn pre_check_body(query: &str, request_type: &str) -> serde_json::Value {
    serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "query": query,
        "request_type": request_type,
    })
}

// -- Liveness ---------------------------------------------------------------

#[tokio::test]
async fn health_returns_200() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = get_json(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["metrics"].is_object());
}

// -- Pre-check scenarios ----------------------------------------------------

#[tokio::test]
async fn safe_sql_query_approved() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT * FROM orders WHERE customer_id = 'cust123'", "sql"),
        Some(RAW_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
    assert_eq!(json["block_reason"], "");
    assert!(json["policies"].as_array().unwrap().is_empty());
    assert!(!json["context_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn sql_injection_blocked() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT * FROM users WHERE id='1' OR '1'='1'", "sql"),
        Some(RAW_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    let reason = json["block_reason"].as_str().unwrap();
    assert!(reason.contains("SQL injection"), "reason: {reason}");
}

#[tokio::test]
async fn drop_table_blocked() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("DROP TABLE users; SELECT * FROM orders", "sql"),
        Some(RAW_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    let policies = json["policies"].as_array().unwrap();
    assert!(!policies.is_empty());
}

#[tokio::test]
async fn ssn_triggers_redaction_but_approves() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("My SSN is 123-45-6789, what can you tell me?", "llm_chat"),
        Some(RAW_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
    let policies: Vec<&str> = json["policies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(policies.contains(&"pii-us-ssn"), "policies: {policies:?}");
}

#[tokio::test]
async fn tenant_mismatch_returns_403_and_persists_nothing() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-b"),
        "client_id": "client-1",
        "query": "SELECT 1",
        "request_type": "sql",
    });
    let (status, _) = post_json(&h.app, "/api/policy/pre-check", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No gateway context reached the queue or the store.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.writer.is_empty());
}

#[tokio::test]
async fn empty_query_is_400() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("", "sql"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "query field is required");
}

#[tokio::test]
async fn unknown_request_type_blocked() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT 1", "graphql"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert_eq!(json["block_reason"], "unsupported request type");
}

#[tokio::test]
async fn missing_license_is_401_in_standard_mode() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, _) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT 1", "sql"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn legacy_license_format_rejected() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, _) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT 1", "sql"),
        Some("wl1.retired-key-material"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stateless_license_authenticates() {
    let h = harness(DeploymentMode::Standard).await;
    let issuer = JwtLicenseValidator::new(SECRET);
    let license = issuer
        .issue(&LicenseClaims {
            org_id: "org-9".into(),
            tenant_id: "tenant-a".into(),
            tier: "enterprise".into(),
            permissions: vec![],
            service_name: None,
            exp: Utc::now().timestamp() + 3600,
        })
        .unwrap();

    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "fresh-client",
        "query": "SELECT 1",
        "request_type": "sql",
    });
    let (status, json) = post_json(&h.app, "/api/policy/pre-check", body, Some(&license)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
}

#[tokio::test]
async fn community_mode_accepts_empty_credentials() {
    let h = harness(DeploymentMode::Community).await;
    let body = serde_json::json!({
        "user_token": "",
        "client_id": "community-client",
        "query": "SELECT 1",
        "request_type": "sql",
    });
    let (status, json) = post_json(&h.app, "/api/policy/pre-check", body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
}

#[tokio::test]
async fn kill_switch_refuses_before_policy() {
    let h = harness(DeploymentMode::Standard).await;
    h.kill_switch.block_client(&ClientId::new("client-1"));

    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT 1", "sql"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert_eq!(json["block_reason"], "kill_switch");
}

#[tokio::test]
async fn critical_regional_pii_blocks() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("my aadhaar is 2345 6789 0123", "llm_chat"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert_eq!(json["block_reason"], "critical_pii_in");
}

#[tokio::test]
async fn approved_data_fetched_from_connector() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "query": "SELECT * FROM orders WHERE region = 'emea'",
        "request_type": "sql",
        "data_sources": ["postgres-main", "restricted", "missing"],
    });
    let (status, json) = post_json(&h.app, "/api/policy/pre-check", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);

    // Granted source fetched; denied and unknown sources skipped,
    // not fatal.
    let data = json["approved_data"].as_object().unwrap();
    assert!(data.contains_key("postgres-main"));
    assert!(!data.contains_key("restricted"));
    assert!(!data.contains_key("missing"));
}

// -- Audit scenarios --------------------------------------------------------

async fn approved_context_id(h: &TestHarness) -> String {
    let (_, json) = post_json(
        &h.app,
        "/api/policy/pre-check",
        pre_check_body("SELECT * FROM orders", "sql"),
        Some(RAW_KEY),
    )
    .await;
    json["context_id"].as_str().unwrap().to_owned()
}

fn audit_body(context_id: &str, client_id: &str) -> serde_json::Value {
    serde_json::json!({
        "context_id": context_id,
        "client_id": client_id,
        "response_summary": "two rows returned",
        "provider": "openai",
        "model": "gpt-4o",
        "token_usage": {"prompt": 100, "completion": 40, "total": 140},
        "latency_ms": 512,
    })
}

#[tokio::test]
async fn audit_after_pre_check_succeeds() {
    let h = harness(DeploymentMode::Standard).await;
    let context_id = approved_context_id(&h).await;

    let (status, json) = post_json(
        &h.app,
        "/api/audit/llm-call",
        audit_body(&context_id, "client-1"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(!json["audit_id"].as_str().unwrap().is_empty());

    // Both entries drain to the writer.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let written = h.writer.written();
    assert!(written.iter().any(|e| e.kind.name() == "gateway_context"));
    assert!(written.iter().any(|e| e.kind.name() == "llm_call_audit"));
}

#[tokio::test]
async fn audit_unknown_context_is_404() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, _) = post_json(
        &h.app,
        "/api/audit/llm-call",
        audit_body("no-such-context", "client-1"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_foreign_context_is_403() {
    let h = harness(DeploymentMode::Standard).await;
    h.store.upsert_client(stored_client("client-2", "tenant-a"));
    let context_id = approved_context_id(&h).await;

    let (status, _) = post_json(
        &h.app,
        "/api/audit/llm-call",
        audit_body(&context_id, "client-2"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn audit_expired_context_is_403() {
    let h = harness(DeploymentMode::Standard).await;
    let mut ctx = GatewayContext::new(ClientId::new("client-1"), chrono::Duration::minutes(5));
    ctx.expires_at = Utc::now() - chrono::Duration::seconds(1);
    h.store.put_context(&ctx).await.unwrap();

    let (status, _) = post_json(
        &h.app,
        "/api/audit/llm-call",
        audit_body(ctx.context_id.as_str(), "client-1"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn audit_missing_fields_is_400() {
    let h = harness(DeploymentMode::Standard).await;
    let (status, json) = post_json(
        &h.app,
        "/api/audit/llm-call",
        serde_json::json!({"context_id": "x", "client_id": "client-1"}),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn repeated_audits_yield_distinct_ids() {
    let h = harness(DeploymentMode::Standard).await;
    let context_id = approved_context_id(&h).await;
    let body = audit_body(&context_id, "client-1");

    let (_, first) = post_json(&h.app, "/api/audit/llm-call", body.clone(), Some(RAW_KEY)).await;
    let (_, second) = post_json(&h.app, "/api/audit/llm-call", body, Some(RAW_KEY)).await;

    assert_eq!(first["success"], true);
    assert_eq!(second["success"], true);
    assert_ne!(first["audit_id"], second["audit_id"]);
}

#[tokio::test]
async fn audit_survives_store_outage_via_fallback() {
    let h = harness(DeploymentMode::Standard).await;
    let context_id = approved_context_id(&h).await;
    // Let the pre-check entry drain before the outage starts.
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Database down: context checks degrade, writer fails, the fallback
    // file takes over.
    h.store.set_available(false);
    h.writer.set_failing(true);

    let (status, json) = post_json(
        &h.app,
        "/api/audit/llm-call",
        audit_body(&context_id, "client-1"),
        Some(RAW_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    // The entry lands in the fallback file within a drain interval.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let contents = std::fs::read_to_string(&h.fallback_path).unwrap();
    assert!(
        contents.lines().any(|l| l.contains("llm_call_audit")),
        "fallback contents: {contents}"
    );

    // The fallback counter is visible on /metrics.
    let (_, metrics) = get_json(&h.app, "/metrics").await;
    assert!(metrics["audit_fallback_total"].as_u64().unwrap() >= 1);
}

// -- Connector surface ------------------------------------------------------

#[tokio::test]
async fn mcp_query_roundtrip() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "connector": "postgres-main",
        "query": "SELECT 1",
    });
    let (status, json) = post_json(&h.app, "/mcp/resources/query", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connector"], "postgres-main");
}

#[tokio::test]
async fn mcp_query_denied_tenant_is_403() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "connector": "restricted",
        "query": "SELECT 1",
    });
    let (status, _) = post_json(&h.app, "/mcp/resources/query", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn service_identity_license_bypasses_grant_list() {
    let h = harness(DeploymentMode::Standard).await;
    let issuer = JwtLicenseValidator::new(SECRET);
    let license = issuer
        .issue(&LicenseClaims {
            org_id: "org-9".into(),
            tenant_id: "tenant-a".into(),
            tier: "enterprise".into(),
            permissions: vec!["connector:restricted".into()],
            service_name: Some("etl-sync".into()),
            exp: Utc::now().timestamp() + 3600,
        })
        .unwrap();

    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "svc-client",
        "connector": "restricted",
        "query": "SELECT 1",
    });
    let (status, _) = post_json(&h.app, "/mcp/resources/query", body, Some(&license)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn connector_listing_and_health() {
    let h = harness(DeploymentMode::Standard).await;

    let (status, json) = get_json(&h.app, "/mcp/connectors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = get_json(&h.app, "/mcp/connectors/postgres-main/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["healthy"], true);

    let (status, _) = get_json(&h.app, "/mcp/connectors/ghost/health").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(&h.app, "/mcp/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["connectors"], 2);
}

// -- Proxy mode -------------------------------------------------------------

#[tokio::test]
async fn proxy_executes_approved_query() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "query": "summarize this quarter's sales figures",
        "request_type": "llm_chat",
    });
    let (status, json) = post_json(&h.app, "/api/proxy/execute", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], true);
    assert_eq!(json["content"], "mock completion");
    assert!(!json["audit_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn proxy_blocks_without_forwarding() {
    let h = harness(DeploymentMode::Standard).await;
    let body = serde_json::json!({
        "user_token": user_token("tenant-a"),
        "client_id": "client-1",
        "query": "'; DROP TABLE users --",
        "request_type": "sql",
    });
    let (status, json) = post_json(&h.app, "/api/proxy/execute", body, Some(RAW_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["approved"], false);
    assert!(json["content"].is_null());
}
