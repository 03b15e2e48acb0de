use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientId, OrgId, TenantId};

/// An authenticated end user on whose behalf a request is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    /// Unique user identifier.
    pub id: String,

    /// Email address, when known.
    pub email: String,

    /// Role name (free-form; "admin" is meaningful to policy checks).
    pub role: String,

    /// Tenant the user belongs to.
    pub tenant_id: TenantId,

    /// Capability strings granted to the user.
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl User {
    /// Return `true` if the user holds the `admin` capability.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.permissions.contains("admin")
    }
}

/// An authenticated client application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Client {
    /// Unique client identifier.
    pub id: ClientId,

    /// Organization the client belongs to.
    pub org_id: OrgId,

    /// Tenant the client is bound to.
    pub tenant_id: TenantId,

    /// Requests per minute granted to this client.
    pub rate_limit: u32,

    /// License tier name (e.g. `"enterprise"`).
    pub license_tier: String,

    /// When the license expires, if bounded.
    pub license_expiry: Option<DateTime<Utc>>,

    /// Whether the client may make requests at all.
    pub enabled: bool,

    /// Service name, for service-identity licenses. When set, permissions
    /// embedded in the license take precedence over stored tenant ACLs.
    pub service_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_permission_detected() {
        let mut user = User {
            id: "u1".into(),
            email: "u1@example.com".into(),
            role: "analyst".into(),
            tenant_id: TenantId::new("tenant-a"),
            permissions: HashSet::new(),
        };
        assert!(!user.is_admin());
        user.permissions.insert("admin".into());
        assert!(user.is_admin());
    }

    #[test]
    fn client_serde_roundtrip() {
        let client = Client {
            id: ClientId::new("client-1"),
            org_id: OrgId::new("org-1"),
            tenant_id: TenantId::new("tenant-a"),
            rate_limit: 120,
            license_tier: "enterprise".into(),
            license_expiry: None,
            enabled: true,
            service_name: Some("etl-sync".into()),
        };
        let json = serde_json::to_string(&client).unwrap();
        let back: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, client.id);
        assert_eq!(back.service_name.as_deref(), Some("etl-sync"));
    }
}
