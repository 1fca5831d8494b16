//! Generation Context: what the generator is told on each attempt
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::data_model::{Severity, ValidationFinding};

/// Upper bound on feedback lines carried into the next attempt
pub const MAX_FEEDBACK_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub trace_id: String,
    /// Which logical device of a batch this is (1-based)
    pub instance_id: u32,
    /// Reference mockup profile the generator should imitate
    pub profile: Option<String>,
    /// 0 for the first attempt, +1 per retry
    pub round: u32,
    /// Problems found in the previous attempt, most severe first
    pub feedback: Vec<String>,
    /// Caller-supplied specifications (manufacturer, capacity, ...)
    pub hints: BTreeMap<String, Value>,
}

impl GenerationContext {
    pub fn new(instance_id: u32) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            instance_id,
            profile: None,
            round: 0,
            feedback: Vec::new(),
            hints: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }

    pub fn is_retry(&self) -> bool {
        self.round > 0
    }
}

/// Derive the context for the next attempt from the previous one and the
/// findings that rejected it. Pure: no clock, no randomness.
pub fn next_context(prior: &GenerationContext, findings: &[ValidationFinding]) -> GenerationContext {
    let errors = findings.iter().filter(|f| f.severity == Severity::Error);
    let warnings = findings.iter().filter(|f| f.severity == Severity::Warning);

    let feedback = errors
        .chain(warnings)
        .take(MAX_FEEDBACK_LINES)
        .map(|f| f.to_string())
        .collect();

    GenerationContext {
        round: prior.round + 1,
        feedback,
        ..prior.clone()
    }
}
