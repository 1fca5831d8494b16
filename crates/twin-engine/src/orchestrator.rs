//! Generation Orchestrator: the bounded generate-validate-retry loop
//!
//! ```text
//! Requesting ──generator──► Validating ──accept──► Accepted
//!     ▲                          │
//!     └──── next_context ◄───────┤ attempts < budget
//!                                └──────────────► Exhausted (best attempt)
//! ```
//!
//! Each attempt depends on the previous attempt's findings, so attempts for
//! one device never overlap. Generator failures (transport, auth, parse,
//! timeout, malformed output) are recorded as candidate-less attempts and
//! consume budget like any rejection.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use twin_core::{
    next_context, CandidateArtifact, ContentGenerator, GenerationAttempt, GenerationContext,
    GenerationError, GenerationOutcome, GenerationReport, ResourceType, TwinError, ValidationResult,
};

use crate::extract::extract_document;
use crate::validator::ComplianceValidator;

/// Which results end the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Zero error findings
    #[default]
    Compliant,
    /// Compliant and at or above the presentation threshold
    PresentationReady,
}

impl Strictness {
    pub fn accepts(&self, result: &ValidationResult) -> bool {
        match self {
            Strictness::Compliant => result.is_compliant,
            Strictness::PresentationReady => result.is_presentation_ready,
        }
    }
}

impl FromStr for Strictness {
    type Err = TwinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "compliant" => Ok(Strictness::Compliant),
            "presentation_ready" => Ok(Strictness::PresentationReady),
            other => Err(TwinError::Config(format!("unknown strictness: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum generator calls per device (at least 1)
    pub retry_budget: u32,

    pub strictness: Strictness,

    /// Upper bound on a single generator call
    pub call_timeout_ms: u64,

    /// Pause after a failed generator call before the next attempt
    pub failure_backoff_ms: u64,
}

impl OrchestratorConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), TwinError> {
        if self.retry_budget == 0 {
            return Err(TwinError::Config("retry_budget must be at least 1".to_string()));
        }
        if self.call_timeout_ms == 0 {
            return Err(TwinError::Config("call_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry_budget: 3,
            strictness: Strictness::Compliant,
            call_timeout_ms: 30_000,
            failure_backoff_ms: 0,
        }
    }
}

pub struct Orchestrator {
    generator: Arc<dyn ContentGenerator>,
    validator: Arc<ComplianceValidator>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        validator: Arc<ComplianceValidator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            generator,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the loop for one device with the configured retry budget
    pub async fn generate(&self, resource_type: ResourceType, ctx: GenerationContext) -> GenerationReport {
        self.generate_with_budget(resource_type, ctx, self.config.retry_budget)
            .await
    }

    /// Run the loop for one device. Never fails: running out of budget is
    /// the `Exhausted` outcome.
    pub async fn generate_with_budget(
        &self,
        resource_type: ResourceType,
        ctx: GenerationContext,
        retry_budget: u32,
    ) -> GenerationReport {
        let budget = retry_budget.max(1);
        let instance_id = ctx.instance_id;
        let profile = ctx.profile.clone();
        let mut ctx = ctx;
        let mut attempts: Vec<GenerationAttempt> = Vec::with_capacity(budget as usize);

        for attempt_number in 1..=budget {
            tracing::debug!(
                trace_id = %ctx.trace_id,
                resource_type = %resource_type,
                instance_id,
                attempt = attempt_number,
                budget,
                generator = self.generator.id(),
                "requesting candidate"
            );

            let started_at = Utc::now();
            let start = Instant::now();
            let produced = self.request_candidate(resource_type, &ctx).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            let (candidate, result, failure) = match produced {
                Ok(candidate) => {
                    let result = self.validator.validate(&candidate);
                    (Some(candidate), result, None)
                }
                Err(err) => {
                    tracing::warn!(
                        trace_id = %ctx.trace_id,
                        resource_type = %resource_type,
                        instance_id,
                        attempt = attempt_number,
                        error = %err,
                        "generator call failed"
                    );
                    (None, ValidationResult::generation_failure(&err), Some(err.to_string()))
                }
            };

            let accepted = candidate.is_some() && self.config.strictness.accepts(&result);
            let attempt = GenerationAttempt {
                attempt_number,
                started_at,
                latency_ms,
                candidate,
                result,
                accepted,
                failure,
            };

            if let Some(artifact) = attempt.candidate.as_ref().filter(|_| attempt.accepted) {
                tracing::info!(
                    trace_id = %ctx.trace_id,
                    resource_type = %resource_type,
                    instance_id,
                    attempt = attempt_number,
                    score = attempt.result.score,
                    warnings = attempt.result.warning_count(),
                    "candidate accepted"
                );
                let outcome = GenerationOutcome::Accepted {
                    attempt_number,
                    artifact: artifact.clone(),
                    result: attempt.result.clone(),
                };
                attempts.push(attempt);
                return GenerationReport {
                    resource_type,
                    instance_id,
                    profile,
                    attempts,
                    outcome,
                };
            }

            if attempt.candidate.is_some() {
                tracing::info!(
                    trace_id = %ctx.trace_id,
                    resource_type = %resource_type,
                    instance_id,
                    attempt = attempt_number,
                    score = attempt.result.score,
                    errors = attempt.result.error_count(),
                    warnings = attempt.result.warning_count(),
                    "candidate rejected"
                );
            }

            let failed_call = attempt.failure.is_some();
            let findings = attempt.result.findings.clone();
            attempts.push(attempt);

            if attempt_number < budget {
                if failed_call && self.config.failure_backoff_ms > 0 {
                    tokio::time::sleep(self.config.failure_backoff()).await;
                }
                ctx = next_context(&ctx, &findings);
            }
        }

        let outcome = exhausted_outcome(&attempts);
        tracing::warn!(
            trace_id = %ctx.trace_id,
            resource_type = %resource_type,
            instance_id,
            attempts = attempts.len(),
            best_score = outcome.result().score,
            "retry budget exhausted"
        );

        GenerationReport {
            resource_type,
            instance_id,
            profile,
            attempts,
            outcome,
        }
    }

    async fn request_candidate(
        &self,
        resource_type: ResourceType,
        ctx: &GenerationContext,
    ) -> Result<CandidateArtifact, GenerationError> {
        let timeout = self.config.call_timeout();
        let raw = tokio::time::timeout(timeout, self.generator.generate(resource_type, ctx))
            .await
            .map_err(|_| GenerationError::Timeout {
                after_ms: timeout.as_millis() as u64,
            })??;
        let document = extract_document(raw)?;
        Ok(CandidateArtifact::new(resource_type, document))
    }
}

/// The best attempt: a candidate beats no candidate, then the
/// higher score wins, then the earlier attempt.
pub fn select_best(attempts: &[GenerationAttempt]) -> Option<&GenerationAttempt> {
    attempts.iter().fold(None, |best, attempt| match best {
        Some(current) if !outranks(attempt, current) => Some(current),
        _ => Some(attempt),
    })
}

fn outranks(challenger: &GenerationAttempt, current: &GenerationAttempt) -> bool {
    match (challenger.candidate.is_some(), current.candidate.is_some()) {
        (true, false) => true,
        (false, true) => false,
        _ => challenger.result.score > current.result.score,
    }
}

/// A rejected artifact is never reported as compliant or presentation-ready,
/// whatever strictness rejected it. Score and findings are kept.
fn exhausted_outcome(attempts: &[GenerationAttempt]) -> GenerationOutcome {
    match select_best(attempts) {
        Some(best) => GenerationOutcome::Exhausted {
            best_attempt: Some(best.attempt_number),
            artifact: best.candidate.clone(),
            result: ValidationResult {
                is_compliant: false,
                is_presentation_ready: false,
                ..best.result.clone()
            },
        },
        None => GenerationOutcome::Exhausted {
            best_attempt: None,
            artifact: None,
            result: ValidationResult::generation_failure("no attempts made"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attempt(number: u32, score: Option<f64>) -> GenerationAttempt {
        let (candidate, result) = match score {
            Some(score) => (
                Some(CandidateArtifact::new(ResourceType::Drive, json!({ "n": number }))),
                ValidationResult {
                    is_compliant: false,
                    score,
                    findings: Vec::new(),
                    is_presentation_ready: false,
                },
            ),
            None => (None, ValidationResult::generation_failure("boom")),
        };
        GenerationAttempt {
            attempt_number: number,
            started_at: Utc::now(),
            latency_ms: 0,
            candidate,
            result,
            accepted: false,
            failure: None,
        }
    }

    #[test]
    fn test_best_is_highest_score() {
        let attempts = vec![attempt(1, Some(60.0)), attempt(2, Some(80.0)), attempt(3, Some(70.0))];
        assert_eq!(select_best(&attempts).unwrap().attempt_number, 2);
    }

    #[test]
    fn test_ties_go_to_earliest() {
        let attempts = vec![attempt(1, Some(70.0)), attempt(2, Some(90.0)), attempt(3, Some(90.0))];
        assert_eq!(select_best(&attempts).unwrap().attempt_number, 2);
    }

    #[test]
    fn test_candidate_beats_generation_failure() {
        let attempts = vec![attempt(1, None), attempt(2, Some(0.0)), attempt(3, None)];
        assert_eq!(select_best(&attempts).unwrap().attempt_number, 2);

        let failures = vec![attempt(1, None), attempt(2, None)];
        assert_eq!(select_best(&failures).unwrap().attempt_number, 1);
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn test_exhausted_outcome_is_never_compliant() {
        let mut compliant = attempt(1, Some(97.0));
        compliant.result.is_compliant = true;
        compliant.result.is_presentation_ready = true;

        let outcome = exhausted_outcome(&[compliant]);

        let result = outcome.result();
        assert!(!result.is_compliant);
        assert!(!result.is_presentation_ready);
        assert_eq!(result.score, 97.0);
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn test_strictness() {
        let messy = ValidationResult {
            is_compliant: true,
            score: 70.0,
            findings: Vec::new(),
            is_presentation_ready: false,
        };
        assert!(Strictness::Compliant.accepts(&messy));
        assert!(!Strictness::PresentationReady.accepts(&messy));
        assert_eq!("presentation-ready".parse::<Strictness>().unwrap(), Strictness::PresentationReady);
        assert!("sloppy".parse::<Strictness>().is_err());
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());

        let zero = OrchestratorConfig {
            retry_budget: 0,
            ..OrchestratorConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
