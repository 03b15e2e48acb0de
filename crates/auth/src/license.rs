use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Prefix of the retired v1 license format. Rejected at the boundary;
/// there is no fallback parser.
pub const LEGACY_LICENSE_PREFIX: &str = "wl1.";

/// Claims carried by a self-contained signed license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseClaims {
    /// Organization the license was issued to.
    pub org_id: String,

    /// Tenant the license is bound to.
    pub tenant_id: String,

    /// License tier name (e.g. `"enterprise"`).
    pub tier: String,

    /// Capability strings embedded in the license. For service-identity
    /// licenses these take precedence over stored tenant ACLs.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Service name for service-identity licenses.
    #[serde(default)]
    pub service_name: Option<String>,

    /// Expiry as a unix timestamp (standard JWT `exp`).
    pub exp: i64,
}

impl LicenseClaims {
    /// Return `true` if this is a service-identity license.
    #[must_use]
    pub fn is_service_identity(&self) -> bool {
        self.service_name.is_some()
    }
}

/// The license cryptography primitive, treated as opaque by the rest of
/// the system: `validate(key)` either yields verified claims or fails.
pub trait LicenseValidator: Send + Sync {
    /// Verify `key` and return its claims.
    fn validate(&self, key: &str) -> Result<LicenseClaims, AuthError>;
}

/// HS256 JWT-backed license validator.
pub struct JwtLicenseValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl JwtLicenseValidator {
    /// Create a validator over a shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a signed license for the given claims. Used by provisioning
    /// tooling and tests.
    pub fn issue(&self, claims: &LicenseClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| AuthError::InvalidLicense)
    }
}

impl LicenseValidator for JwtLicenseValidator {
    fn validate(&self, key: &str) -> Result<LicenseClaims, AuthError> {
        if key.starts_with(LEGACY_LICENSE_PREFIX) {
            return Err(AuthError::LegacyLicense);
        }
        let data = decode::<LicenseClaims>(key, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::LicenseExpired,
                _ => AuthError::InvalidLicense,
            })?;
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::LicenseExpired);
        }
        Ok(data.claims)
    }
}
