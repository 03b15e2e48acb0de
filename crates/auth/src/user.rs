use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use warden_core::{TenantId, User};

use crate::error::AuthError;

/// How the deployment treats user tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// Standard mode: user tokens are required and verified.
    #[default]
    Standard,
    /// Community (self-hosted) mode: any token, including an empty one,
    /// yields a synthetic admin bound to the expected tenant.
    Community,
}

/// Claims carried by a user token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User identifier.
    pub sub: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Role name.
    #[serde(default)]
    pub role: String,
    /// Tenant the user belongs to.
    pub tenant_id: String,
    /// Capability strings.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Validates user tokens according to the deployment mode.
pub struct UserTokenValidator {
    mode: DeploymentMode,
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl UserTokenValidator {
    /// Create a validator over a shared secret.
    #[must_use]
    pub fn new(secret: &str, mode: DeploymentMode) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            mode,
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// The configured deployment mode.
    #[must_use]
    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Issue a signed user token. Used by provisioning tooling and tests.
    pub fn issue(&self, claims: &UserClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| AuthError::InvalidUserToken)
    }

    /// Validate `token` and return the user it identifies.
    ///
    /// In community mode any token (including empty) yields a synthetic
    /// admin bound to `expected_tenant`. In standard mode an empty token
    /// is rejected and the claims must verify.
    pub fn validate(&self, token: &str, expected_tenant: &TenantId) -> Result<User, AuthError> {
        if self.mode == DeploymentMode::Community {
            return Ok(Self::community_admin(expected_tenant));
        }

        if token.is_empty() {
            return Err(AuthError::InvalidUserToken);
        }

        let data = decode::<UserClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| AuthError::InvalidUserToken)?;
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidUserToken);
        }

        Ok(User {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
            tenant_id: TenantId::new(data.claims.tenant_id),
            permissions: data.claims.permissions.into_iter().collect(),
        })
    }

    fn community_admin(tenant: &TenantId) -> User {
        let mut permissions = HashSet::new();
        permissions.insert("admin".to_owned());
        User {
            id: "community-admin".into(),
            email: String::new(),
            role: "admin".into(),
            tenant_id: tenant.clone(),
            permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(tenant: &str, exp_offset_secs: i64) -> UserClaims {
        UserClaims {
            sub: "u1".into(),
            email: "u1@example.com".into(),
            role: "analyst".into(),
            tenant_id: tenant.into(),
            permissions: vec!["query".into()],
            exp: Utc::now().timestamp() + exp_offset_secs,
        }
    }

    #[test]
    fn standard_mode_validates_token() {
        let v = UserTokenValidator::new("secret", DeploymentMode::Standard);
        let token = v.issue(&claims("tenant-a", 3600)).unwrap();
        let user = v.validate(&token, &TenantId::new("tenant-a")).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.tenant_id.as_str(), "tenant-a");
        assert!(user.permissions.contains("query"));
    }

    #[test]
    fn standard_mode_rejects_empty_token() {
        let v = UserTokenValidator::new("secret", DeploymentMode::Standard);
        assert_eq!(
            v.validate("", &TenantId::new("tenant-a")).unwrap_err(),
            AuthError::InvalidUserToken
        );
    }

    #[test]
    fn standard_mode_rejects_expired_token() {
        let v = UserTokenValidator::new("secret", DeploymentMode::Standard);
        let token = v.issue(&claims("tenant-a", -60)).unwrap();
        assert_eq!(
            v.validate(&token, &TenantId::new("tenant-a")).unwrap_err(),
            AuthError::InvalidUserToken
        );
    }

    #[test]
    fn community_mode_accepts_empty_token() {
        let v = UserTokenValidator::new("secret", DeploymentMode::Community);
        let user = v.validate("", &TenantId::new("tenant-a")).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.tenant_id.as_str(), "tenant-a");
    }

    #[test]
    fn community_mode_ignores_token_contents() {
        let v = UserTokenValidator::new("secret", DeploymentMode::Community);
        let user = v
            .validate("complete-garbage", &TenantId::new("tenant-b"))
            .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.tenant_id.as_str(), "tenant-b");
    }
}
