use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use warden_auth::AuthError;
use warden_connector::ConnectorError;

/// Errors surfaced through the HTTP API.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request is malformed or missing required fields.
    #[error("{0}")]
    Validation(String),

    /// Authentication failed. The message stays opaque.
    #[error("{0}")]
    Unauthorized(String),

    /// Tenant mismatch, disabled client, or insufficient permission.
    #[error("{0}")]
    Forbidden(String),

    /// A connector or context does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Rate limit exceeded on the MCP surface.
    #[error("rate limit exceeded")]
    RateLimited {
        /// Seconds until the caller can retry.
        retry_after: u64,
    },

    /// The policy store could not produce a snapshot; pre-check fails
    /// closed.
    #[error("policy_engine_unavailable")]
    PolicyUnavailable,

    /// Both the audit queue and the fallback file refused an entry.
    #[error("audit pipeline unavailable: {0}")]
    AuditUnavailable(String),

    /// An unrecoverable engine fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ServerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TenantMismatch | AuthError::ClientDisabled => Self::Forbidden(e.to_string()),
            AuthError::Unavailable(msg) => Self::Internal(msg),
            _ => Self::Unauthorized(e.to_string()),
        }
    }
}

impl From<ConnectorError> for ServerError {
    fn from(e: ConnectorError) -> Self {
        match e {
            ConnectorError::NotFound(_) => Self::NotFound(e.to_string()),
            ConnectorError::AccessDenied { .. } => Self::Forbidden(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate limit exceeded".to_owned(),
                Some(*retry_after),
            ),
            Self::PolicyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "policy_engine_unavailable".to_owned(),
                None,
            ),
            Self::AuditUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), None),
            Self::Config(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None),
        };

        let body = serde_json::json!({ "error": message });
        let mut response = (status, axum::Json(body)).into_response();

        if let Some(retry) = retry_after {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, retry.into());
        }

        response
    }
}
