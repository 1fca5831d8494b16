//! Twin Core: data model, errors and generator seams
//!
//! Shared vocabulary for the synthetic device-resource generator. Every other
//! crate in the workspace speaks in these types: the rule engine and schema
//! checker produce [`ValidationFinding`]s, the scorer turns them into a
//! [`ValidationResult`], and the orchestrator records one
//! [`GenerationAttempt`] per call to a [`ContentGenerator`].

pub mod context;
pub mod data_model;
pub mod error;
pub mod generator;
pub mod policy;
pub mod recorder;

pub use context::{next_context, GenerationContext, MAX_FEEDBACK_LINES};
pub use data_model::{
    CandidateArtifact, FindingKind, GenerationAttempt, GenerationOutcome, GenerationReport,
    ResourceType, Severity, ValidationFinding, ValidationResult,
};
pub use error::TwinError;
pub use generator::{ContentGenerator, GenerationError, RawContent};
pub use policy::{SchemaViolationClass, SeverityPolicy};
pub use recorder::Recorder;

/// Engine version stamped into reports
pub const TWIN_VERSION: &str = env!("CARGO_PKG_VERSION");
