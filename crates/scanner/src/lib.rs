//! Pattern scanning for the Warden policy engine.
//!
//! The scanner is pure: patterns compile once at construction, matching
//! performs no I/O and touches no shared mutable state. Construction fails
//! on any invalid pattern, which callers treat as a startup error.

pub mod code;
pub mod error;
pub mod patterns;
pub mod regional;
pub mod scanner;
pub mod validators;

pub use code::{
    CodeBlock, CodeClassification, CodeLanguage, CodeType, classify_code, detect_language,
    extract_code_blocks,
};
pub use error::ScanError;
pub use patterns::{BuiltinPattern, builtin_patterns, seed_policies};
pub use regional::{IndiaPiiDetector, RegionalPiiDetector, RegionalPiiMatch};
pub use scanner::{PatternMatch, Scanner, Span};
pub use validators::validate_span;

/// Hard cap on scan input size. Larger inputs are rejected outright.
pub const MAX_INPUT_BYTES: usize = 1_048_576;
