//! Compliance scorer
//!
//! `score = max(0, 100 - errors * error_penalty - warnings * warning_penalty)`.
//! Only the counts matter, so finding order never changes the score.

use twin_core::{Severity, ValidationFinding, ValidationResult};

use crate::profile::ScoringProfile;

#[derive(Debug, Clone, Default)]
pub struct ComplianceScorer {
    profile: ScoringProfile,
}

impl ComplianceScorer {
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Combine both finding sequences (rule findings first, no deduplication)
    /// into one result.
    pub fn score(
        &self,
        rule_findings: &[ValidationFinding],
        schema_findings: &[ValidationFinding],
    ) -> ValidationResult {
        let findings: Vec<ValidationFinding> = rule_findings
            .iter()
            .chain(schema_findings)
            .cloned()
            .collect();

        let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
        let warnings = findings.len() - errors;

        let mut score = 100.0;
        score -= errors as f64 * self.profile.error_penalty;
        score -= warnings as f64 * self.profile.warning_penalty;
        let score = score.max(0.0);

        let is_compliant = errors == 0;
        let is_presentation_ready = is_compliant && score >= self.profile.presentation_threshold;

        ValidationResult {
            is_compliant,
            score,
            findings,
            is_presentation_ready,
        }
    }
}
