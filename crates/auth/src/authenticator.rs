use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use warden_core::{Client, ClientId, OrgId, TenantId, User};
use warden_store::ClientStore;

use crate::error::AuthError;
use crate::hash_secret;
use crate::license::{LicenseClaims, LicenseValidator};
use crate::user::UserTokenValidator;

/// Validates clients and users and enforces tenant isolation.
///
/// Client validation tries two strategies in order:
/// 1. the legacy API-key path: a stored client record whose key hash
///    matches the presented key;
/// 2. the stateless path: a self-contained signed license.
pub struct Authenticator {
    clients: Arc<dyn ClientStore>,
    license: Arc<dyn LicenseValidator>,
    users: UserTokenValidator,
}

impl Authenticator {
    /// Create an authenticator over its collaborators.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStore>,
        license: Arc<dyn LicenseValidator>,
        users: UserTokenValidator,
    ) -> Self {
        Self {
            clients,
            license,
            users,
        }
    }

    /// The user token validator.
    #[must_use]
    pub fn users(&self) -> &UserTokenValidator {
        &self.users
    }

    /// Validate a client id + license key pair.
    ///
    /// Also returns the license claims when the stateless path was used,
    /// so callers can honour service-identity permissions.
    pub async fn validate_client(
        &self,
        client_id: &ClientId,
        license_key: &str,
    ) -> Result<(Client, Option<LicenseClaims>), AuthError> {
        let now = Utc::now();

        // Strategy 1: stored API-key record.
        let record = match self.clients.get_client(client_id).await {
            Ok(record) => record,
            Err(e) => {
                // Store outage: the stateless path can still authenticate.
                warn!(error = %e, "client store unavailable, trying stateless license");
                None
            }
        };

        if let Some(ref record) = record
            && record.license_key_hash == hash_secret(license_key)
        {
            let client = record.client.clone();
            check_client_usable(&client, now)?;
            debug!(client = %client.id, "client authenticated via stored key");
            return Ok((client, None));
        }

        // Strategy 2: self-contained signed license.
        let claims = self.license.validate(license_key)?;
        if let Some(ref record) = record {
            // The stored record stays authoritative for tier and enabled.
            if record.client.license_tier != claims.tier {
                return Err(AuthError::TierMismatch);
            }
            if !record.client.enabled {
                return Err(AuthError::ClientDisabled);
            }
        }

        let client = client_from_claims(client_id, &claims);
        check_client_usable(&client, now)?;
        debug!(client = %client.id, "client authenticated via signed license");
        Ok((client, Some(claims)))
    }

    /// Validate a user token for the client's tenant.
    pub fn validate_user_token(
        &self,
        token: &str,
        expected_tenant: &TenantId,
    ) -> Result<User, AuthError> {
        self.users.validate(token, expected_tenant)
    }

    /// Enforce tenant isolation: the user's tenant must equal the
    /// client's. A mismatch is a hard failure with no partial results.
    pub fn ensure_tenant_match(user: &User, client: &Client) -> Result<(), AuthError> {
        if user.tenant_id == client.tenant_id {
            Ok(())
        } else {
            warn!(
                user_tenant = %user.tenant_id,
                client_tenant = %client.tenant_id,
                "tenant isolation violation"
            );
            Err(AuthError::TenantMismatch)
        }
    }
}

fn check_client_usable(client: &Client, now: DateTime<Utc>) -> Result<(), AuthError> {
    if !client.enabled {
        return Err(AuthError::ClientDisabled);
    }
    if let Some(expiry) = client.license_expiry
        && expiry <= now
    {
        return Err(AuthError::LicenseExpired);
    }
    Ok(())
}

fn client_from_claims(client_id: &ClientId, claims: &LicenseClaims) -> Client {
    Client {
        id: client_id.clone(),
        org_id: OrgId::new(claims.org_id.clone()),
        tenant_id: TenantId::new(claims.tenant_id.clone()),
        rate_limit: default_rate_limit(&claims.tier),
        license_tier: claims.tier.clone(),
        license_expiry: DateTime::from_timestamp(claims.exp, 0),
        enabled: true,
        service_name: claims.service_name.clone(),
    }
}

/// Per-minute request budget by tier, used when no stored record exists.
fn default_rate_limit(tier: &str) -> u32 {
    match tier {
        "enterprise" => 600,
        "pro" => 120,
        _ => 60,
    }
}
