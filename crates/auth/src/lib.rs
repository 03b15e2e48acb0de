//! Authentication and tenant context for the Warden gateway.
//!
//! Validation is read-only per request: the authenticator holds no mutable
//! state beyond the store handles it is constructed with. Raw credentials
//! are never logged; call [`hash_secret`] before recording anything.

pub mod authenticator;
pub mod error;
pub mod license;
pub mod user;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use license::{JwtLicenseValidator, LicenseClaims, LicenseValidator, LEGACY_LICENSE_PREFIX};
pub use user::{DeploymentMode, UserClaims, UserTokenValidator};

use sha2::{Digest, Sha256};

/// Hash a secret to the storage and logging format (lowercase hex SHA-256).
#[must_use]
pub fn hash_secret(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
