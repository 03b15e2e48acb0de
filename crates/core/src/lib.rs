pub mod audit;
pub mod context;
pub mod error;
pub mod identity;
pub mod policy;
pub mod request;
pub mod response;
pub mod types;

pub use audit::{AuditEntry, AuditEntryKind, LlmCallAudit, TokenUsage};
pub use context::GatewayContext;
pub use error::WardenError;
pub use identity::{Client, User};
pub use policy::{
    EffectivePolicy, Policy, PolicyAction, PolicyCategory, PolicyOverride, PolicyTier, Severity,
};
pub use request::RequestType;
pub use response::{ChatChoice, ResponseBody};
pub use types::{ClientId, ContextId, OrgId, PolicyId, TenantId};
