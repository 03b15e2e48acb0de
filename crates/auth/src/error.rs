use thiserror::Error;

/// Authentication and authorization failures.
///
/// Messages are deliberately opaque: they are surfaced to callers on 401
/// responses and must not leak which part of a credential was wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The license key is malformed, unsigned, or unknown.
    #[error("invalid license")]
    InvalidLicense,

    /// The license uses the retired v1 format. There is no fallback path.
    #[error("unsupported license format")]
    LegacyLicense,

    /// The license or client registration has expired.
    #[error("license expired")]
    LicenseExpired,

    /// The client exists but is disabled.
    #[error("client disabled")]
    ClientDisabled,

    /// A signed license's tier disagrees with the stored client record.
    #[error("license tier mismatch")]
    TierMismatch,

    /// The user token is missing, malformed, or unsigned.
    #[error("invalid user token")]
    InvalidUserToken,

    /// The user's tenant does not match the client's tenant.
    #[error("tenant mismatch")]
    TenantMismatch,

    /// The client store could not be reached.
    #[error("auth backend unavailable: {0}")]
    Unavailable(String),
}
