use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrgId, PolicyId, TenantId};

/// Severity of a policy violation, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Low risk.
    Low,
    /// Moderate risk.
    #[default]
    Medium,
    /// High risk.
    High,
    /// Critical risk; typically paired with a block action.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// What to do when a policy's pattern matches the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Reject the request outright.
    Block,
    /// Allow the request but mark the matched span for redaction.
    Redact,
    /// Allow the request and record a warning.
    Warn,
    /// Explicitly allow (overrides nothing, tags the verdict).
    Allow,
}

/// Which tier a policy belongs to. System policies take precedence over
/// organization policies, which take precedence over tenant policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PolicyTier {
    /// Platform-wide; applies to every tenant.
    System,
    /// Scoped to one organization.
    Organization,
    /// Scoped to one tenant.
    Tenant,
}

impl PolicyTier {
    /// Precedence rank: lower ranks sort first in the merged ordering.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::System => 0,
            Self::Organization => 1,
            Self::Tenant => 2,
        }
    }
}

/// Classification of what a policy detects. The category routes the input
/// to the matching scanner checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum PolicyCategory {
    /// SQL-injection shapes (union select, tautologies, stacked statements).
    SecuritySqli,
    /// Destructive or privilege-escalating database operations.
    DangerousOp,
    /// United States personally identifiable information.
    PiiUs,
    /// Indian personally identifiable information.
    PiiIn,
    /// Embedded credentials and key material in code.
    CodeSecrets,
    /// Unsafe execution primitives in code.
    CodeUnsafe,
    /// Organization-specific code compliance rules.
    CodeCompliance,
    /// Operations reserved for administrators.
    AdminAccess,
}

impl std::fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SecuritySqli => write!(f, "security-sqli"),
            Self::DangerousOp => write!(f, "dangerous-op"),
            Self::PiiUs => write!(f, "pii-us"),
            Self::PiiIn => write!(f, "pii-in"),
            Self::CodeSecrets => write!(f, "code-secrets"),
            Self::CodeUnsafe => write!(f, "code-unsafe"),
            Self::CodeCompliance => write!(f, "code-compliance"),
            Self::AdminAccess => write!(f, "admin-access"),
        }
    }
}

/// A static policy: a named, tiered pattern with an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Policy {
    /// Stable identifier, unique within the policy set.
    pub policy_id: PolicyId,

    /// Human-readable name, surfaced as the block reason.
    pub name: String,

    /// What this policy detects.
    pub category: PolicyCategory,

    /// Regex source applied to the input. Compiled once per snapshot.
    pub pattern: String,

    /// Severity when the pattern matches.
    pub severity: Severity,

    /// What to do on a match.
    pub action: PolicyAction,

    /// Which tier this policy belongs to.
    pub tier: PolicyTier,

    /// Ordering within a tier; higher values are evaluated first.
    pub priority: i32,

    /// Whether the policy is active.
    pub enabled: bool,

    /// Organization scope, for organization-tier policies.
    pub organization_id: Option<OrgId>,

    /// Tenant scope, for tenant-tier policies.
    pub tenant_id: Option<TenantId>,

    /// Version number for tracking policy changes.
    #[serde(default)]
    pub version: u64,

    /// When the policy was created.
    pub created_at: DateTime<Utc>,

    /// When the policy was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Create a new enabled system-tier policy with priority 0.
    #[must_use]
    pub fn new(
        policy_id: impl Into<PolicyId>,
        name: impl Into<String>,
        category: PolicyCategory,
        pattern: impl Into<String>,
        severity: Severity,
        action: PolicyAction,
    ) -> Self {
        let now = Utc::now();
        Self {
            policy_id: policy_id.into(),
            name: name.into(),
            category,
            pattern: pattern.into(),
            severity,
            action,
            tier: PolicyTier::System,
            priority: 0,
            enabled: true,
            organization_id: None,
            tenant_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the tier.
    #[must_use]
    pub fn with_tier(mut self, tier: PolicyTier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Scope the policy to an organization.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<OrgId>) -> Self {
        self.organization_id = Some(org.into());
        self
    }

    /// Scope the policy to a tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant.into());
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// A per-(tenant, org) override attached to a policy instance.
///
/// At most one live override exists per (policy, tenant, org).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PolicyOverride {
    /// The policy this override applies to.
    pub policy_id: PolicyId,

    /// Tenant scope of the override.
    pub tenant_id: Option<TenantId>,

    /// Organization scope of the override.
    pub organization_id: Option<OrgId>,

    /// Replacement action, if any.
    pub action_override: Option<PolicyAction>,

    /// Replacement enabled flag, if any.
    pub enabled_override: Option<bool>,

    /// When the override stops applying.
    pub expires_at: Option<DateTime<Utc>>,

    /// Why the override was created.
    pub reason: Option<String>,
}

impl PolicyOverride {
    /// Return `true` if the override has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// The merge of a base [`Policy`] with its matching [`PolicyOverride`].
///
/// Action and enabled reflect the override when it is present and not
/// expired at merge time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePolicy {
    /// The base policy.
    pub policy: Policy,

    /// Effective action after applying the override.
    pub action: PolicyAction,

    /// Effective enabled flag after applying the override.
    pub enabled: bool,

    /// Whether an override was applied.
    pub overridden: bool,
}

impl EffectivePolicy {
    /// Merge a policy with an optional override evaluated at `now`.
    #[must_use]
    pub fn merge(policy: Policy, ov: Option<&PolicyOverride>, now: DateTime<Utc>) -> Self {
        let live = ov.filter(|o| !o.is_expired(now));
        let action = live
            .and_then(|o| o.action_override)
            .unwrap_or(policy.action);
        let enabled = live
            .and_then(|o| o.enabled_override)
            .unwrap_or(policy.enabled);
        Self {
            policy,
            action,
            enabled,
            overridden: live.is_some(),
        }
    }

    /// Evaluation-order key: tier (system first), then priority descending,
    /// then `policy_id` ascending for a deterministic tie-break.
    #[must_use]
    pub fn order_key(&self) -> (u8, i32, &str) {
        (
            self.policy.tier.rank(),
            -self.policy.priority,
            self.policy.policy_id.as_str(),
        )
    }

    /// Compare two effective policies in evaluation order.
    #[must_use]
    pub fn order(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}
