use chrono::{DateTime, Utc};
use regex::Regex;

use warden_core::{EffectivePolicy, Policy, PolicyOverride};

use crate::error::PolicyError;

/// An effective policy with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    /// The merged policy.
    pub effective: EffectivePolicy,
    /// The compiled pattern.
    pub regex: Regex,
}

/// An immutable, ordered view of the effective policy set for one
/// (tenant, org) scope.
///
/// Snapshots are built once per cache miss and shared behind `Arc`; they
/// never change until the cache entry expires or is invalidated.
#[derive(Debug)]
pub struct PolicySnapshot {
    /// Enabled policies in evaluation order: tier (system first), then
    /// priority descending, then policy id.
    pub policies: Vec<CompiledPolicy>,
    /// When the snapshot was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Merge raw store rows into an ordered, compiled snapshot.
    ///
    /// Disabled policies (after override application) are dropped. When
    /// the same policy id appears in several tiers the highest-precedence
    /// instance wins.
    pub fn build(
        rows: Vec<(Policy, Option<PolicyOverride>)>,
        now: DateTime<Utc>,
    ) -> Result<Self, PolicyError> {
        let mut merged: Vec<EffectivePolicy> = rows
            .into_iter()
            .map(|(policy, ov)| EffectivePolicy::merge(policy, ov.as_ref(), now))
            .filter(|eff| eff.enabled)
            .collect();

        merged.sort_by(|a, b| a.order(b));
        merged.dedup_by(|b, a| a.policy.policy_id == b.policy.policy_id);

        let policies = merged
            .into_iter()
            .map(|effective| {
                let regex =
                    Regex::new(&effective.policy.pattern).map_err(|e| PolicyError::InvalidPattern {
                        id: effective.policy.policy_id.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(CompiledPolicy { effective, regex })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        Ok(Self {
            policies,
            loaded_at: now,
        })
    }

    /// Number of policies in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Return `true` if the snapshot holds no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
