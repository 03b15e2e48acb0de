//! Policy repository and static policy engine.
//!
//! The repository loads, merges, and caches the effective policy set per
//! (tenant, org); the engine applies a cached snapshot to one input and
//! produces a deterministic verdict.

pub mod engine;
pub mod error;
pub mod repository;
pub mod snapshot;

pub use engine::{
    EvaluationResult, EvaluationState, PolicyEngine, RedactionSpan, TriggeredPolicy,
};
pub use error::PolicyError;
pub use repository::PolicyRepository;
pub use snapshot::{CompiledPolicy, PolicySnapshot};
