use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ClientId, ContextId};

/// The short-lived receipt issued by a successful pre-check.
///
/// Binds the pre-check to the audit call that must follow: the audit
/// handler requires a non-expired context owned by the same client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GatewayContext {
    /// Unique context identifier (UUID v4).
    pub context_id: ContextId,

    /// Client the context was issued to.
    pub client_id: ClientId,

    /// SHA-256 hex of the user token presented at pre-check.
    pub user_token_hash: String,

    /// SHA-256 hex of the checked query.
    pub query_hash: String,

    /// Data sources requested at pre-check.
    #[serde(default)]
    pub data_sources: Vec<String>,

    /// Policy ids evaluated during the pre-check.
    #[serde(default)]
    pub policies_evaluated: Vec<String>,

    /// Whether the pre-check approved the request.
    pub approved: bool,

    /// Block reason, empty when approved.
    #[serde(default)]
    pub block_reason: String,

    /// When the context was issued.
    pub created_at: DateTime<Utc>,

    /// When the context stops being accepted by the audit handler.
    pub expires_at: DateTime<Utc>,
}

impl GatewayContext {
    /// Create a new context with a fresh UUID, expiring after `ttl`.
    #[must_use]
    pub fn new(client_id: ClientId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            context_id: ContextId::new(Uuid::new_v4().to_string()),
            client_id,
            user_token_hash: String::new(),
            query_hash: String::new(),
            data_sources: Vec::new(),
            policies_evaluated: Vec::new(),
            approved: false,
            block_reason: String::new(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Return `true` if the context has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Return `true` if the context was issued to `client_id`.
    #[must_use]
    pub fn belongs_to(&self, client_id: &ClientId) -> bool {
        &self.client_id == client_id
    }
}
