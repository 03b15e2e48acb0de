use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use warden_audit::{
    AuditQueue, AuditQueueConfig, AuditWriter, FallbackFile, MemoryAuditWriter,
    PostgresAuditWriter, RetryPolicy,
};
use warden_auth::{Authenticator, JwtLicenseValidator, UserTokenValidator};
use warden_connector::{ConnectorRegistry, LogConnector, load_connectors_file};
use warden_core::Policy;
use warden_policy::{PolicyEngine, PolicyRepository};
use warden_scanner::{IndiaPiiDetector, RegionalPiiDetector, Scanner, seed_policies};
use warden_server::api;
use warden_server::config::WardenConfig;
use warden_server::{
    MemoryKillSwitch, PricingTable, RateLimiter, RuntimeSettings, ServerError, ServerMetrics,
    ServiceContext,
};
use warden_store::{ClientStore, ContextStore, MemoryStore, PolicyStore, PostgresStore};

/// Warden gateway HTTP server.
#[derive(Parser, Debug)]
#[command(name = "warden-server", about = "AI-governance gateway for LLM and data access")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "warden.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config: WardenConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        WardenConfig::default()
    };

    // Pattern compilation is the first thing that can fail: an invalid
    // built-in pattern aborts startup.
    let _scanner = Scanner::new()?;

    // Persistence backend. One store implements every capability; the
    // handlers only see the traits.
    let (policy_store, context_store, client_store, audit_writer): (
        Arc<dyn PolicyStore>,
        Arc<dyn ContextStore>,
        Arc<dyn ClientStore>,
        Arc<dyn AuditWriter>,
    ) = match config.store.backend.as_str() {
        "memory" => {
            let store = Arc::new(MemoryStore::with_policies(seed_policies()));
            info!("using in-memory store with seeded system policies");
            (
                Arc::clone(&store) as _,
                Arc::clone(&store) as _,
                store as _,
                Arc::new(MemoryAuditWriter::new()) as _,
            )
        }
        "postgres" => {
            let url = config
                .store
                .url
                .as_deref()
                .ok_or_else(|| ServerError::Config("store.url is required for postgres".into()))?;
            let store = Arc::new(PostgresStore::new(url, &config.store.prefix).await?);
            seed_if_empty(&store).await?;
            let writer =
                PostgresAuditWriter::new(store.pool().clone(), &config.store.prefix).await?;
            info!(prefix = %config.store.prefix, "using postgres store");
            (
                Arc::clone(&store) as _,
                Arc::clone(&store) as _,
                store as _,
                Arc::new(writer) as _,
            )
        }
        other => {
            return Err(ServerError::Config(format!("unknown store backend: {other}")).into());
        }
    };

    // Audit queue with fallback file.
    let fallback = Arc::new(
        FallbackFile::open(
            Path::new(&config.audit.fallback_path),
            Duration::from_secs(config.audit.fsync_interval_seconds),
        )
        .await?,
    );
    let queue = Arc::new(AuditQueue::spawn(
        audit_writer,
        fallback,
        AuditQueueConfig {
            capacity: config.audit.queue_capacity,
            batch_size: config.audit.batch_size,
            batch_window: Duration::from_millis(config.audit.batch_window_ms),
            mode: config.audit.mode,
            retry: RetryPolicy {
                max_attempts: config.audit.max_attempts.max(3),
                ..RetryPolicy::default()
            },
        },
    ));

    // Policy repository and engine.
    let repository = Arc::new(PolicyRepository::new(
        policy_store,
        Duration::from_secs(config.policy.cache_ttl_seconds),
    ));

    // Authentication.
    let authenticator = Arc::new(Authenticator::new(
        client_store,
        Arc::new(JwtLicenseValidator::new(&config.deployment.license_secret)),
        UserTokenValidator::new(&config.deployment.user_token_secret, config.deployment.mode),
    ));

    // Connector registry from the YAML file, when configured.
    let registry = Arc::new(ConnectorRegistry::new());
    if let Some(ref file) = config.connectors.file {
        let parsed = load_connectors_file(Path::new(file))?;
        for (name, entry) in &parsed.connectors {
            if !entry.enabled {
                info!(connector = %name, "connector disabled, not registered");
                continue;
            }
            // Driver construction is delegated to out-of-tree builds; the
            // in-tree fallback logs instead of reaching a real backend.
            if entry.kind != "log" {
                warn!(connector = %name, kind = %entry.kind, "no in-tree driver, using log connector");
            }
            registry.register(Arc::new(LogConnector::new(name.clone())), entry);
        }
        info!(count = registry.count(), "connectors registered");
    }

    let regional: Vec<Arc<dyn RegionalPiiDetector>> = vec![Arc::new(IndiaPiiDetector::new()?)];

    let rate_limiter = config
        .rate_limit
        .enabled
        .then(|| Arc::new(RateLimiter::new(Duration::from_secs(config.rate_limit.window_seconds))));

    if config.proxy.enabled {
        warn!("proxy.enabled is set but no orchestrator is linked into this build");
    }

    let state = ServiceContext {
        engine: PolicyEngine::new(),
        policies: repository,
        auth: authenticator,
        connectors: registry,
        audit: Arc::clone(&queue),
        contexts: context_store,
        kill_switch: Some(Arc::new(MemoryKillSwitch::new())),
        rate_limiter,
        regional: Arc::new(regional),
        pricing: PricingTable::new(),
        metrics: Arc::new(ServerMetrics::default()),
        orchestrator: None,
        settings: RuntimeSettings {
            context_ttl: chrono::Duration::minutes(
                i64::try_from(config.deployment.context_ttl_minutes.max(5)).unwrap_or(5),
            ),
            permissive: config.deployment.permissive,
            community_tenant: config.deployment.community_tenant.clone(),
            health_deadline: Duration::from_millis(config.connectors.health_deadline_ms),
            fetch_deadline: Duration::from_secs(5),
            tenant_rate_limit: config.rate_limit.tenant_requests_per_window,
        },
    };

    let app = api::router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "warden-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain the audit queue before exiting; entries that cannot be
    // written are spilled to the fallback file.
    queue
        .shutdown(Duration::from_secs(config.server.shutdown_timeout_seconds))
        .await;

    info!("warden-server shut down");
    Ok(())
}

/// Seed the system-tier policy set on first run.
async fn seed_if_empty(store: &PostgresStore) -> Result<(), ServerError> {
    let count = store
        .policy_count()
        .await
        .map_err(|e| ServerError::Config(e.to_string()))?;
    if count > 0 {
        return Ok(());
    }
    let policies: Vec<Policy> = seed_policies();
    for policy in &policies {
        store
            .upsert_policy(policy)
            .await
            .map_err(|e| ServerError::Config(e.to_string()))?;
    }
    info!(count = policies.len(), "seeded system policies");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
