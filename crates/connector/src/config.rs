//! Connector configuration loading.
//!
//! Connectors are described in a YAML file whose string values support
//! `${VAR}` / `${VAR:-default}` environment expansion. Effective
//! configuration is merged with the priority database > file > environment.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConnectorError;

/// Credentials block of a connector entry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConnectorCredentials {
    /// Username, when the connector needs one.
    #[serde(default)]
    pub username: String,
    /// Password, when the connector needs one.
    #[serde(default)]
    pub password: String,
}

/// One connector definition.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectorEntry {
    /// Connector kind (e.g. `"postgres"`, `"slack"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the entry should be registered. Disabled entries are
    /// parsed but not registered.
    pub enabled: bool,
    /// Connection URL. `${VAR:-default}` expansion applies.
    pub connection_url: String,
    /// Optional credentials.
    pub credentials: ConnectorCredentials,
    /// Per-operation timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry budget for transient failures.
    pub max_retries: u32,
    /// Tenants allowed to use this connector. `"*"` grants all.
    pub allowed_tenants: Vec<String>,
}

impl Default for ConnectorEntry {
    fn default() -> Self {
        Self {
            kind: "log".to_owned(),
            enabled: true,
            connection_url: String::new(),
            credentials: ConnectorCredentials::default(),
            timeout_ms: 5_000,
            max_retries: 3,
            allowed_tenants: vec!["*".to_owned()],
        }
    }
}

/// One LLM provider definition (routed by the downstream orchestrator;
/// carried in the same file for deployment convenience).
#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderEntry {
    /// Whether the provider is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Provider-specific configuration.
    #[serde(default)]
    pub config: HashMap<String, serde_yaml_ng::Value>,
    /// Routing priority.
    #[serde(default)]
    pub priority: i32,
    /// Routing weight.
    #[serde(default)]
    pub weight: f64,
}

/// The connectors YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectorsFile {
    /// File format version.
    #[serde(default)]
    pub version: String,
    /// Connector definitions by name.
    #[serde(default)]
    pub connectors: HashMap<String, ConnectorEntry>,
    /// LLM provider definitions by name.
    #[serde(default)]
    pub llm_providers: HashMap<String, LlmProviderEntry>,
}

/// Expand `${VAR}` and `${VAR:-default}` references in `input` from the
/// process environment. Unset variables without a default expand to the
/// empty string.
#[must_use]
pub fn expand_env_str(input: &str) -> String {
    expand_env_with(input, |var| std::env::var(var).ok())
}

/// Expansion core with an injectable variable lookup.
fn expand_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    static VAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = VAR_RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("env regex compiles")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| {
            caps.get(2)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default()
        })
    })
    .into_owned()
}

/// Load and parse a connectors YAML file, expanding environment
/// references in every string value.
pub fn load_connectors_file(path: &Path) -> Result<ConnectorsFile, ConnectorError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConnectorError::Configuration(format!("{}: {e}", path.display())))?;
    let expanded = expand_env_str(&raw);
    let file: ConnectorsFile = serde_yaml_ng::from_str(&expanded)
        .map_err(|e| ConnectorError::Configuration(format!("{}: {e}", path.display())))?;
    debug!(
        path = %path.display(),
        connectors = file.connectors.len(),
        "loaded connectors file"
    );
    Ok(file)
}

/// Merge connector definitions by precedence: database > file > environment.
///
/// Each map is keyed by connector name; for a given name the
/// highest-priority source that defines it wins outright (no field-level
/// merging, matching how the sources are produced).
#[must_use]
pub fn merge_sources(
    database: HashMap<String, ConnectorEntry>,
    file: HashMap<String, ConnectorEntry>,
    environment: HashMap<String, ConnectorEntry>,
) -> HashMap<String, ConnectorEntry> {
    let mut merged = environment;
    merged.extend(file);
    merged.extend(database);
    merged
}
