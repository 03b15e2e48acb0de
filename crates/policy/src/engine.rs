use serde::{Deserialize, Serialize};
use tracing::debug;

use warden_core::{PolicyAction, PolicyCategory, RequestType, Severity, User};
use warden_scanner::validate_span;

use crate::snapshot::PolicySnapshot;

/// Block reason used when an admin-category policy matches for a
/// non-admin user.
pub const PRIVILEGE_ESCALATION: &str = "privilege_escalation";

/// Block reason used for request types outside the closed set.
pub const UNSUPPORTED_REQUEST_TYPE: &str = "unsupported request type";

/// A policy that matched during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredPolicy {
    /// The policy id.
    pub policy_id: String,
    /// The policy name.
    pub name: String,
    /// Category of the policy.
    pub category: PolicyCategory,
    /// Severity of the policy.
    pub severity: Severity,
    /// The effective action applied.
    pub action: PolicyAction,
}

/// A byte span in the input to redact before downstream use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// The policy that requested the redaction.
    pub policy_id: String,
}

/// Terminal state of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    /// The input passed all enabled policies.
    Allowed,
    /// A blocking policy matched.
    Blocked,
    /// The input passed but carries redaction spans.
    AllowedWithRedactions,
}

/// The outcome of evaluating one input against a policy snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Terminal state.
    pub state: EvaluationState,
    /// Whether the request is blocked.
    pub blocked: bool,
    /// Block reason (the matched policy's name), when blocked.
    pub reason: Option<String>,
    /// Every policy that matched, in evaluation order.
    pub triggered_policies: Vec<TriggeredPolicy>,
    /// Every category actually evaluated, in order, without duplicates.
    pub checks_performed: Vec<PolicyCategory>,
    /// Spans to redact, when the request is allowed with redactions.
    pub redactions: Vec<RedactionSpan>,
}

impl EvaluationResult {
    fn blocked_with(reason: impl Into<String>) -> Self {
        Self {
            state: EvaluationState::Blocked,
            blocked: true,
            reason: Some(reason.into()),
            triggered_policies: Vec::new(),
            checks_performed: Vec::new(),
            redactions: Vec::new(),
        }
    }
}

/// The static policy engine.
///
/// Pure over its inputs: identical (user, input, request type, snapshot)
/// always produces an identical result, including the ordering of
/// `triggered_policies`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Create an engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `input` for `user` against `snapshot`.
    ///
    /// `request_type` is validated against the closed set first; unknown
    /// types block without evaluating any policy.
    #[must_use]
    pub fn evaluate(
        &self,
        user: &User,
        input: &str,
        request_type: &str,
        snapshot: &PolicySnapshot,
    ) -> EvaluationResult {
        if RequestType::parse(request_type).is_none() {
            return EvaluationResult::blocked_with(UNSUPPORTED_REQUEST_TYPE);
        }

        let mut triggered = Vec::new();
        let mut checks = Vec::new();
        let mut redactions = Vec::new();

        for compiled in &snapshot.policies {
            let policy = &compiled.effective.policy;
            if !checks.contains(&policy.category) {
                checks.push(policy.category);
            }

            let matched = compiled
                .regex
                .find_iter(input)
                .any(|m| validate_span(policy.policy_id.as_str(), m.as_str()));
            if !matched {
                continue;
            }

            let entry = TriggeredPolicy {
                policy_id: policy.policy_id.to_string(),
                name: policy.name.clone(),
                category: policy.category,
                severity: policy.severity,
                action: compiled.effective.action,
            };

            // Admin-only categories require the admin capability no matter
            // what the policy's own action says.
            if policy.category == PolicyCategory::AdminAccess && !user.is_admin() {
                debug!(policy = %policy.policy_id, user = %user.id, "admin match without privilege");
                triggered.push(entry);
                return EvaluationResult {
                    state: EvaluationState::Blocked,
                    blocked: true,
                    reason: Some(PRIVILEGE_ESCALATION.to_owned()),
                    triggered_policies: triggered,
                    checks_performed: checks,
                    redactions,
                };
            }

            match compiled.effective.action {
                PolicyAction::Block => {
                    let reason = policy.name.clone();
                    triggered.push(entry);
                    return EvaluationResult {
                        state: EvaluationState::Blocked,
                        blocked: true,
                        reason: Some(reason),
                        triggered_policies: triggered,
                        checks_performed: checks,
                        redactions,
                    };
                }
                PolicyAction::Redact => {
                    // Every valid occurrence of the pattern is redacted.
                    for m in compiled
                        .regex
                        .find_iter(input)
                        .filter(|m| validate_span(policy.policy_id.as_str(), m.as_str()))
                    {
                        redactions.push(RedactionSpan {
                            start: m.start(),
                            end: m.end(),
                            policy_id: policy.policy_id.to_string(),
                        });
                    }
                    triggered.push(entry);
                }
                PolicyAction::Warn | PolicyAction::Allow => {
                    triggered.push(entry);
                }
            }
        }

        let state = if redactions.is_empty() {
            EvaluationState::Allowed
        } else {
            EvaluationState::AllowedWithRedactions
        };

        EvaluationResult {
            state,
            blocked: false,
            reason: None,
            triggered_policies: triggered,
            checks_performed: checks,
            redactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use warden_core::{Policy, PolicyOverride, TenantId};
    use warden_scanner::seed_policies;

    use super::*;

    fn user(tenant: &str) -> User {
        User {
            id: "u1".into(),
            email: "u1@example.com".into(),
            role: "analyst".into(),
            tenant_id: TenantId::new(tenant),
            permissions: HashSet::new(),
        }
    }

    fn admin(tenant: &str) -> User {
        let mut u = user(tenant);
        u.permissions.insert("admin".into());
        u
    }

    fn builtin_snapshot() -> PolicySnapshot {
        let rows: Vec<(Policy, Option<PolicyOverride>)> =
            seed_policies().into_iter().map(|p| (p, None)).collect();
        PolicySnapshot::build(rows, Utc::now()).unwrap()
    }

    #[test]
    fn unknown_request_type_blocked() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(&user("t"), "hello", "graphql", &snap);
        assert!(result.blocked);
        assert_eq!(result.reason.as_deref(), Some(UNSUPPORTED_REQUEST_TYPE));
        assert!(result.checks_performed.is_empty());
    }

    #[test]
    fn safe_query_allowed() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &user("t"),
            "SELECT * FROM orders WHERE customer_id = 'cust123'",
            "sql",
            &snap,
        );
        assert!(!result.blocked);
        assert_eq!(result.state, EvaluationState::Allowed);
        assert!(result.triggered_policies.is_empty());
        assert!(!result.checks_performed.is_empty());
    }

    #[test]
    fn sqli_tautology_blocks() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &user("t"),
            "SELECT * FROM users WHERE id='1' OR '1'='1'",
            "sql",
            &snap,
        );
        assert!(result.blocked);
        let reason = result.reason.unwrap();
        assert!(reason.contains("SQL injection"), "reason: {reason}");
        assert!(!result.triggered_policies.is_empty());
    }

    #[test]
    fn drop_table_blocks() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &user("t"),
            "DROP TABLE users; SELECT * FROM orders",
            "sql",
            &snap,
        );
        assert!(result.blocked);
        assert!(
            result
                .triggered_policies
                .iter()
                .any(|p| p.category == PolicyCategory::DangerousOp
                    || p.category == PolicyCategory::SecuritySqli)
        );
    }

    #[test]
    fn ssn_redacts_but_allows() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &user("t"),
            "My SSN is 123-45-6789, what can you tell me?",
            "llm_chat",
            &snap,
        );
        assert!(!result.blocked);
        assert_eq!(result.state, EvaluationState::AllowedWithRedactions);
        assert!(
            result
                .triggered_policies
                .iter()
                .any(|p| p.policy_id == "pii-us-ssn")
        );
        assert!(!result.redactions.is_empty());
    }

    #[test]
    fn admin_category_blocks_non_admin() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &user("t"),
            "GRANT ALL PRIVILEGES ON db.* TO 'eve'",
            "sql",
            &snap,
        );
        assert!(result.blocked);
        assert_eq!(result.reason.as_deref(), Some(PRIVILEGE_ESCALATION));
    }

    #[test]
    fn admin_category_passes_admin() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(
            &admin("t"),
            "GRANT SELECT ON reports TO analyst_role",
            "sql",
            &snap,
        );
        assert!(!result.blocked, "reason: {:?}", result.reason);
        assert!(
            result
                .triggered_policies
                .iter()
                .any(|p| p.category == PolicyCategory::AdminAccess)
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let snap = builtin_snapshot();
        let input = "card 4111 1111 1111 1111 and email bob@example.com";
        let engine = PolicyEngine::new();
        let a = engine.evaluate(&user("t"), input, "llm_chat", &snap);
        let b = engine.evaluate(&user("t"), input, "llm_chat", &snap);
        let ids_a: Vec<_> = a.triggered_policies.iter().map(|p| &p.policy_id).collect();
        let ids_b: Vec<_> = b.triggered_policies.iter().map(|p| &p.policy_id).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.checks_performed, b.checks_performed);
    }

    #[test]
    fn checks_performed_has_no_duplicates() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(&user("t"), "plain text", "llm_chat", &snap);
        let unique: HashSet<_> = result.checks_performed.iter().collect();
        assert_eq!(unique.len(), result.checks_performed.len());
    }

    #[test]
    fn empty_input_allowed() {
        let snap = builtin_snapshot();
        let result = PolicyEngine::new().evaluate(&user("t"), "", "llm_chat", &snap);
        assert!(!result.blocked);
        assert!(result.triggered_policies.is_empty());
    }
}
