//! The gateway request pipeline.
//!
//! Gateway Mode is the two-step protocol: [`ServiceContext::pre_check`]
//! issues a context, the client performs its LLM call, then
//! [`ServiceContext::record_llm_call`] presents the context for audit.
//! Proxy Mode ([`ServiceContext::proxy_execute`]) runs the same internals
//! in one round trip with the orchestrator in the middle.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use warden_audit::AuditError;
use warden_auth::{Authenticator, DeploymentMode, LicenseClaims, hash_secret};
use warden_core::{
    AuditEntry, Client, ClientId, ContextId, GatewayContext, LlmCallAudit, OrgId, TenantId, User,
};
use warden_scanner::MAX_INPUT_BYTES;

use crate::api::schemas::{
    AuditLlmCallRequest, AuditLlmCallResponse, PreCheckRequest, PreCheckResponse,
    ProxyExecuteRequest, ProxyExecuteResponse,
};
use crate::context::ServiceContext;
use crate::error::ServerError;
use crate::ratelimit::RateLimitInfo;

/// Block reason for kill-switch refusals.
const REASON_KILL_SWITCH: &str = "kill_switch";

/// Block reason for rate-limit refusals.
const REASON_RATE_LIMIT: &str = "rate_limit_exceeded";

/// Pseudo-policy tag applied in permissive mode when the policy store is
/// down.
const TAG_POLICY_UNAVAILABLE: &str = "policy_engine_unavailable";

impl ServiceContext {
    /// Gateway Mode step 1: authenticate, enforce policies, issue a
    /// context, and enqueue its audit record.
    pub async fn pre_check(
        &self,
        req: PreCheckRequest,
        license_key: Option<&str>,
    ) -> Result<PreCheckResponse, ServerError> {
        self.metrics.increment_pre_checks();

        if req.client_id.is_empty() {
            return Err(ServerError::Validation("client_id field is required".into()));
        }
        if req.query.is_empty() {
            return Err(ServerError::Validation("query field is required".into()));
        }
        if req.query.len() > MAX_INPUT_BYTES {
            return Err(ServerError::Validation(format!(
                "query exceeds the {MAX_INPUT_BYTES} byte limit"
            )));
        }
        let request_type = req.request_type.as_deref().unwrap_or("llm_chat");

        // Authentication and tenant isolation come before any policy or
        // data-source work. A mismatch produces no partial results.
        let (client, claims) = self.authenticate_client(&req.client_id, license_key).await?;
        let user = self.authenticate_user(&req.user_token, &client)?;

        // Rate limits produce a block verdict before the policy engine
        // runs.
        let rate_limit = match self.check_rate_limits(&client) {
            Ok(info) => info,
            Err(info) => {
                self.metrics.increment_rate_limited();
                return self
                    .refuse(&req, &client, REASON_RATE_LIMIT, vec![], Some(info))
                    .await;
            }
        };

        if let Some(ref kill_switch) = self.kill_switch
            && kill_switch.is_blocked(&client.id, &client.tenant_id).await
        {
            self.metrics.increment_kill_switch();
            return self
                .refuse(&req, &client, REASON_KILL_SWITCH, vec![], rate_limit)
                .await;
        }

        // Regional critical PII blocks before the policy engine.
        for detector in self.regional.iter() {
            if detector.block_recommended(&req.query) {
                let reason = format!(
                    "critical_pii_{}",
                    detector.region().to_ascii_lowercase()
                );
                return self.refuse(&req, &client, &reason, vec![], rate_limit).await;
            }
        }

        // Policy evaluation. A store outage fails closed unless the
        // deployment is explicitly permissive.
        let (blocked, reason, triggered) = match self
            .policies
            .snapshot(&client.tenant_id, Some(&client.org_id))
            .await
        {
            Ok(snapshot) => {
                let result = self.engine.evaluate(&user, &req.query, request_type, &snapshot);
                debug!(
                    tenant = %client.tenant_id,
                    state = ?result.state,
                    triggered = result.triggered_policies.len(),
                    "policy evaluation complete"
                );
                let triggered: Vec<String> = result
                    .triggered_policies
                    .iter()
                    .map(|p| p.policy_id.clone())
                    .collect();
                (result.blocked, result.reason, triggered)
            }
            Err(e) => {
                if self.settings.permissive {
                    warn!(error = %e, "policy store unavailable, permissive mode allows");
                    (false, None, vec![TAG_POLICY_UNAVAILABLE.to_owned()])
                } else {
                    warn!(error = %e, "policy store unavailable, failing closed");
                    return Err(ServerError::PolicyUnavailable);
                }
            }
        };

        if blocked {
            let reason = reason.unwrap_or_default();
            return self.refuse(&req, &client, &reason, triggered, rate_limit).await;
        }

        // Best-effort data fetches: per-source failures are logged and
        // skipped, never fatal.
        let approved_data = if req.data_sources.is_empty() {
            None
        } else {
            Some(
                self.fetch_sources(&client, claims.as_ref(), &req.data_sources, &req.query)
                    .await,
            )
        };

        let ctx = self.build_context(&req, &client, true, String::new(), triggered.clone());
        self.persist_and_enqueue(ctx.clone()).await?;
        self.metrics.increment_approved();

        Ok(PreCheckResponse {
            context_id: ctx.context_id.to_string(),
            approved: true,
            approved_data,
            policies: triggered,
            rate_limit,
            expires_at: ctx.expires_at,
            block_reason: String::new(),
        })
    }

    /// Gateway Mode step 2: verify the context binding and enqueue the
    /// LLM call audit. Never fails the client for audit-pipeline errors;
    /// only a queue-and-fallback double failure surfaces.
    pub async fn record_llm_call(
        &self,
        req: AuditLlmCallRequest,
        license_key: Option<&str>,
    ) -> Result<AuditLlmCallResponse, ServerError> {
        for (field, value) in [
            ("context_id", &req.context_id),
            ("client_id", &req.client_id),
            ("provider", &req.provider),
            ("model", &req.model),
        ] {
            if value.is_empty() {
                return Err(ServerError::Validation(format!("{field} field is required")));
            }
        }

        let (client, _claims) = self.authenticate_client(&req.client_id, license_key).await?;

        // Context binding: required when the store is reachable; a store
        // outage degrades to best-effort acceptance and the queue's
        // durability guarantees take over.
        let context_id = ContextId::new(req.context_id.clone());
        match self.contexts.get_context(&context_id).await {
            Ok(Some(ctx)) => {
                if !ctx.belongs_to(&client.id) {
                    return Err(ServerError::Forbidden(
                        "context does not belong to this client".into(),
                    ));
                }
                if ctx.is_expired(Utc::now()) {
                    return Err(ServerError::Forbidden("context expired".into()));
                }
            }
            Ok(None) => {
                return Err(ServerError::NotFound("unknown context".into()));
            }
            Err(e) => {
                warn!(error = %e, "context store unavailable, accepting audit best-effort");
            }
        }

        let mut audit = LlmCallAudit::new(
            context_id,
            client.id.clone(),
            req.provider.clone(),
            req.model.clone(),
            req.token_usage,
        );
        audit.latency_ms = req.latency_ms;
        audit.estimated_cost_usd = self
            .pricing
            .estimate(&req.provider, &req.model, req.token_usage);
        audit.metadata = serde_json::json!({
            "response_summary": req.response_summary,
            "caller_metadata": req.metadata,
        });
        let audit_id = audit.audit_id.clone();

        match self.audit.enqueue(AuditEntry::llm_call(audit)).await {
            Ok(()) => {}
            Err(AuditError::Rejected(msg)) => {
                return Err(ServerError::AuditUnavailable(msg));
            }
            Err(e) => {
                warn!(error = %e, "audit enqueue failed, accepting best-effort");
            }
        }

        self.metrics.increment_audits();
        info!(audit_id = %audit_id, client = %client.id, "llm call audited");
        Ok(AuditLlmCallResponse {
            success: true,
            audit_id,
        })
    }

    /// Proxy Mode: pre-check, forward through the orchestrator, audit,
    /// all in one round trip.
    pub async fn proxy_execute(
        &self,
        req: ProxyExecuteRequest,
        license_key: Option<&str>,
    ) -> Result<ProxyExecuteResponse, ServerError> {
        let pre = self
            .pre_check(
                PreCheckRequest {
                    user_token: req.user_token.clone(),
                    client_id: req.client_id.clone(),
                    data_sources: Vec::new(),
                    query: req.query.clone(),
                    request_type: req.request_type.clone(),
                    context: None,
                },
                license_key,
            )
            .await?;

        if !pre.approved {
            return Ok(ProxyExecuteResponse {
                context_id: pre.context_id,
                approved: false,
                block_reason: pre.block_reason,
                content: None,
                audit_id: None,
            });
        }

        let orchestrator = self
            .orchestrator
            .as_ref()
            .ok_or_else(|| ServerError::Internal("no orchestrator configured".into()))?;
        let response = orchestrator.complete(&req.query).await?;
        let content = response.body.content();

        let summary: String = content.chars().take(200).collect();
        let audited = self
            .record_llm_call(
                AuditLlmCallRequest {
                    context_id: pre.context_id.clone(),
                    client_id: req.client_id,
                    response_summary: summary,
                    provider: response.provider,
                    model: response.model,
                    token_usage: response.token_usage,
                    latency_ms: response.latency_ms,
                    metadata: None,
                },
                license_key,
            )
            .await?;

        Ok(ProxyExecuteResponse {
            context_id: pre.context_id,
            approved: true,
            block_reason: String::new(),
            content: Some(content),
            audit_id: Some(audited.audit_id),
        })
    }

    // -- Shared internals -------------------------------------------------

    /// Authenticate the calling client.
    ///
    /// In community mode the `X-License-Key` header is optional: the
    /// client is synthesized and bound to the configured community
    /// tenant.
    pub(crate) async fn authenticate_client(
        &self,
        client_id: &str,
        license_key: Option<&str>,
    ) -> Result<(Client, Option<LicenseClaims>), ServerError> {
        if self.auth.users().mode() == DeploymentMode::Community {
            return Ok((self.community_client(client_id), None));
        }

        let Some(key) = license_key else {
            return Err(ServerError::Unauthorized("missing license key".into()));
        };
        let (client, claims) = self
            .auth
            .validate_client(&ClientId::new(client_id), key)
            .await?;
        Ok((client, claims))
    }

    /// Validate the user token and enforce tenant isolation.
    pub(crate) fn authenticate_user(
        &self,
        user_token: &str,
        client: &Client,
    ) -> Result<User, ServerError> {
        let user = self
            .auth
            .validate_user_token(user_token, &client.tenant_id)?;
        Authenticator::ensure_tenant_match(&user, client)?;
        Ok(user)
    }

    fn community_client(&self, client_id: &str) -> Client {
        Client {
            id: ClientId::new(client_id),
            org_id: OrgId::new("community"),
            tenant_id: TenantId::new(self.settings.community_tenant.clone()),
            rate_limit: 600,
            license_tier: "community".into(),
            license_expiry: None,
            enabled: true,
            service_name: None,
        }
    }

    /// Check the per-client and per-tenant budgets. Returns the client's
    /// remaining budget on success.
    fn check_rate_limits(&self, client: &Client) -> Result<Option<RateLimitInfo>, RateLimitInfo> {
        let Some(ref limiter) = self.rate_limiter else {
            return Ok(None);
        };

        let client_bucket = format!("client:{}", client.id);
        let info = limiter
            .check(&client_bucket, u64::from(client.rate_limit))
            .map_err(|e| RateLimitInfo {
                limit: e.limit,
                remaining: 0,
                reset_after: e.retry_after,
            })?;

        let tenant_bucket = format!("tenant:{}", client.tenant_id);
        limiter
            .check(&tenant_bucket, self.settings.tenant_rate_limit)
            .map_err(|e| RateLimitInfo {
                limit: e.limit,
                remaining: 0,
                reset_after: e.retry_after,
            })?;

        Ok(Some(info))
    }

    /// Fetch each requested source through the registry, best-effort.
    async fn fetch_sources(
        &self,
        client: &Client,
        claims: Option<&LicenseClaims>,
        sources: &[String],
        query: &str,
    ) -> BTreeMap<String, serde_json::Value> {
        // Service-identity licenses carry their own permission list,
        // which takes precedence over stored grant lists.
        let service_permissions = claims
            .filter(|c| c.is_service_identity())
            .map(|c| c.permissions.as_slice());

        let mut results = BTreeMap::new();
        for name in sources {
            let connector = match self.connectors.validate_tenant_access(
                name,
                &client.tenant_id,
                service_permissions,
            ) {
                Ok(connector) => connector,
                Err(e) => {
                    warn!(connector = %name, error = %e, "data source access refused");
                    continue;
                }
            };

            match tokio::time::timeout(self.settings.fetch_deadline, connector.query(query)).await
            {
                Ok(Ok(value)) => {
                    results.insert(name.clone(), value);
                }
                Ok(Err(e)) => {
                    warn!(connector = %name, error = %e, "data source fetch failed");
                }
                Err(_) => {
                    warn!(connector = %name, "data source fetch timed out");
                }
            }
        }
        results
    }

    fn build_context(
        &self,
        req: &PreCheckRequest,
        client: &Client,
        approved: bool,
        block_reason: String,
        policies: Vec<String>,
    ) -> GatewayContext {
        let mut ctx = GatewayContext::new(client.id.clone(), self.settings.context_ttl);
        ctx.user_token_hash = hash_secret(&req.user_token);
        ctx.query_hash = hash_secret(&req.query);
        ctx.data_sources = req.data_sources.clone();
        ctx.policies_evaluated = policies;
        ctx.approved = approved;
        ctx.block_reason = block_reason;
        ctx
    }

    /// Persist the context and enqueue its audit entry.
    ///
    /// Persistence is best-effort (the queue's fallback file covers a
    /// store outage); only a queue-and-fallback double failure errors.
    async fn persist_and_enqueue(&self, ctx: GatewayContext) -> Result<(), ServerError> {
        if let Err(e) = self.contexts.put_context(&ctx).await {
            warn!(error = %e, "context persist failed, relying on audit fallback");
        }
        match self.audit.enqueue(AuditEntry::gateway_context(ctx)).await {
            Ok(()) => Ok(()),
            Err(AuditError::Rejected(msg)) => Err(ServerError::AuditUnavailable(msg)),
            Err(e) => {
                warn!(error = %e, "gateway context enqueue failed");
                Ok(())
            }
        }
    }

    /// Build, record, and return a refusal.
    async fn refuse(
        &self,
        req: &PreCheckRequest,
        client: &Client,
        reason: &str,
        policies: Vec<String>,
        rate_limit: Option<RateLimitInfo>,
    ) -> Result<PreCheckResponse, ServerError> {
        info!(client = %client.id, reason, "pre-check refused");
        let ctx = self.build_context(req, client, false, reason.to_owned(), policies.clone());
        self.persist_and_enqueue(ctx.clone()).await?;
        self.metrics.increment_blocked();

        Ok(PreCheckResponse {
            context_id: ctx.context_id.to_string(),
            approved: false,
            approved_data: None,
            policies,
            rate_limit,
            expires_at: ctx.expires_at,
            block_reason: reason.to_owned(),
        })
    }
}
