use serde::Deserialize;

use warden_audit::QueueMode;
use warden_auth::DeploymentMode;

/// Top-level configuration for the Warden server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct WardenConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Deployment mode and secrets.
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Persistence backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Policy cache configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Audit queue configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Connector file configuration.
    #[serde(default)]
    pub connectors: ConnectorsConfig,
    /// Proxy mode configuration.
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout in seconds. Must exceed the audit
    /// queue's drain time.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Deployment mode, secrets, and failure-mode switches.
#[derive(Debug, Deserialize)]
pub struct DeploymentConfig {
    /// `standard` or `community`. Community mode accepts any user token
    /// (including empty) as a synthetic admin and makes the
    /// `X-License-Key` header optional.
    #[serde(default)]
    pub mode: DeploymentMode,
    /// Tenant that community-mode requests are bound to.
    #[serde(default = "default_community_tenant")]
    pub community_tenant: String,
    /// Secret verifying self-contained license keys.
    #[serde(default = "default_secret")]
    pub license_secret: String,
    /// Secret verifying user tokens.
    #[serde(default = "default_secret")]
    pub user_token_secret: String,
    /// When `true`, a policy-store outage lets requests through with a
    /// `policy_engine_unavailable` tag instead of failing closed.
    #[serde(default)]
    pub permissive: bool,
    /// Gateway context lifetime in minutes. Clamped to at least 5.
    #[serde(default = "default_context_ttl")]
    pub context_ttl_minutes: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::default(),
            community_tenant: default_community_tenant(),
            license_secret: default_secret(),
            user_token_secret: default_secret(),
            permissive: false,
            context_ttl_minutes: default_context_ttl(),
        }
    }
}

fn default_community_tenant() -> String {
    "default".to_owned()
}

fn default_secret() -> String {
    // Development default; deployments override via config.
    "warden-dev-secret".to_owned()
}

fn default_context_ttl() -> u64 {
    5
}

/// Persistence backend configuration.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: `"memory"` or `"postgres"`.
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// Connection URL for the postgres backend.
    pub url: Option<String>,
    /// Table prefix. Defaults to `"warden_"`.
    #[serde(default = "default_store_prefix")]
    pub prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            prefix: default_store_prefix(),
        }
    }
}

fn default_store_backend() -> String {
    "memory".to_owned()
}

fn default_store_prefix() -> String {
    "warden_".to_owned()
}

/// Policy cache configuration.
#[derive(Debug, Deserialize)]
pub struct PolicyConfig {
    /// Snapshot cache TTL in seconds. Clamped to [60, 1800].
    #[serde(default = "default_policy_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_policy_ttl(),
        }
    }
}

fn default_policy_ttl() -> u64 {
    300
}

/// Audit queue configuration.
#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Maximum entries held in memory.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum entries per backend write.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum milliseconds an entry waits before its batch is written.
    #[serde(default = "default_batch_window")]
    pub batch_window_ms: u64,
    /// Overflow behavior: `compliance` (never drop) or `performance`
    /// (drop oldest).
    #[serde(default)]
    pub mode: QueueMode,
    /// Total write attempts per batch.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fallback file path.
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,
    /// Seconds between fallback-file fsyncs.
    #[serde(default = "default_fsync_interval")]
    pub fsync_interval_seconds: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            batch_size: default_batch_size(),
            batch_window_ms: default_batch_window(),
            mode: QueueMode::default(),
            max_attempts: default_max_attempts(),
            fallback_path: default_fallback_path(),
            fsync_interval_seconds: default_fsync_interval(),
        }
    }
}

fn default_queue_capacity() -> usize {
    100
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_window() -> u64 {
    250
}

fn default_max_attempts() -> u32 {
    3
}

fn default_fallback_path() -> String {
    "warden-audit-fallback.ndjson".to_owned()
}

fn default_fsync_interval() -> u64 {
    1
}

/// Rate limiting configuration.
#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled.
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Window size in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub window_seconds: u64,
    /// Per-tenant budget per window. The per-client budget comes from
    /// each client's record.
    #[serde(default = "default_tenant_budget")]
    pub tenant_requests_per_window: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            window_seconds: default_rate_limit_window(),
            tenant_requests_per_window: default_tenant_budget(),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_tenant_budget() -> u64 {
    1200
}

/// Connector file configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectorsConfig {
    /// Path to the connectors YAML file.
    pub file: Option<String>,
    /// Per-check health deadline in milliseconds.
    #[serde(default = "default_health_deadline")]
    pub health_deadline_ms: u64,
}

fn default_health_deadline() -> u64 {
    2_000
}

/// Proxy mode configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyConfig {
    /// Whether the single-shot proxy endpoint is exposed.
    #[serde(default)]
    pub enabled: bool,
}
