//! Batch statistics
//!
//! Append-only tallies over finished generation reports. Owned by a single
//! writer (the batch aggregator); readers get a snapshot when it is done.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use twin_core::{GenerationReport, ResourceType};

/// Coarse quality band of a final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    VeryGood,
    Good,
    Acceptable,
    NeedsImprovement,
    Poor,
}

impl QualityTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityTier::Excellent
        } else if score >= 80.0 {
            QualityTier::VeryGood
        } else if score >= 70.0 {
            QualityTier::Good
        } else if score >= 60.0 {
            QualityTier::Acceptable
        } else if score >= 50.0 {
            QualityTier::NeedsImprovement
        } else {
            QualityTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "excellent",
            QualityTier::VeryGood => "very good",
            QualityTier::Good => "good",
            QualityTier::Acceptable => "acceptable",
            QualityTier::NeedsImprovement => "needs improvement",
            QualityTier::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTally {
    pub accepted: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub accepted: usize,
    pub exhausted: usize,
    pub presentation_ready: usize,
    pub total_attempts: usize,
    pub generation_failures: usize,
    pub average_score: f64,
    pub tiers: BTreeMap<QualityTier, usize>,
    pub by_type: BTreeMap<ResourceType, TypeTally>,
    #[serde(skip)]
    score_sum: f64,
}

impl BatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &GenerationReport) {
        let result = report.outcome.result();

        self.total += 1;
        if report.is_accepted() {
            self.accepted += 1;
        } else {
            self.exhausted += 1;
        }
        if result.is_presentation_ready {
            self.presentation_ready += 1;
        }
        self.total_attempts += report.attempt_count();
        self.generation_failures += report.generation_failures();

        self.score_sum += result.score;
        self.average_score = self.score_sum / self.total as f64;

        *self.tiers.entry(QualityTier::from_score(result.score)).or_default() += 1;

        let tally = self.by_type.entry(report.resource_type).or_default();
        tally.total += 1;
        if report.is_accepted() {
            tally.accepted += 1;
        }
    }

    /// Accepted fraction in [0, 1]; an empty batch reports 0
    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f64 / self.total as f64
        }
    }

    pub fn average_attempts(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.total_attempts as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use twin_core::{CandidateArtifact, GenerationAttempt, GenerationOutcome, ValidationResult};

    fn result(score: f64, compliant: bool) -> ValidationResult {
        ValidationResult {
            is_compliant: compliant,
            score,
            findings: Vec::new(),
            is_presentation_ready: compliant && score >= 75.0,
        }
    }

    fn attempt(number: u32, candidate: Option<CandidateArtifact>, result: ValidationResult) -> GenerationAttempt {
        GenerationAttempt {
            attempt_number: number,
            started_at: Utc::now(),
            latency_ms: 1,
            failure: candidate.is_none().then(|| "timeout".to_string()),
            candidate,
            accepted: false,
            result,
        }
    }

    fn accepted(resource_type: ResourceType, score: f64) -> GenerationReport {
        let artifact = CandidateArtifact::new(resource_type, json!({ "Id": "1" }));
        let result = result(score, true);
        GenerationReport {
            resource_type,
            instance_id: 1,
            profile: None,
            attempts: vec![attempt(1, Some(artifact.clone()), result.clone())],
            outcome: GenerationOutcome::Accepted {
                attempt_number: 1,
                artifact,
                result,
            },
        }
    }

    fn exhausted(resource_type: ResourceType) -> GenerationReport {
        let failed = ValidationResult::generation_failure("timeout");
        GenerationReport {
            resource_type,
            instance_id: 2,
            profile: None,
            attempts: vec![attempt(1, None, failed.clone()), attempt(2, None, failed.clone())],
            outcome: GenerationOutcome::Exhausted {
                best_attempt: Some(1),
                artifact: None,
                result: failed,
            },
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(QualityTier::from_score(100.0), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(90.0), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(89.9), QualityTier::VeryGood);
        assert_eq!(QualityTier::from_score(70.0), QualityTier::Good);
        assert_eq!(QualityTier::from_score(60.0), QualityTier::Acceptable);
        assert_eq!(QualityTier::from_score(50.0), QualityTier::NeedsImprovement);
        assert_eq!(QualityTier::from_score(0.0), QualityTier::Poor);
    }

    #[test]
    fn test_record_tallies() {
        let mut stats = BatchStatistics::new();
        stats.record(&accepted(ResourceType::Drive, 100.0));
        stats.record(&accepted(ResourceType::Drive, 70.0));
        stats.record(&exhausted(ResourceType::Volume));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.exhausted, 1);
        assert_eq!(stats.presentation_ready, 1);
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.generation_failures, 2);
        assert!((stats.average_score - 170.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.tiers.get(&QualityTier::Excellent), Some(&1));
        assert_eq!(stats.tiers.get(&QualityTier::Poor), Some(&1));
        assert_eq!(
            stats.by_type.get(&ResourceType::Drive),
            Some(&TypeTally { accepted: 2, total: 2 })
        );
        assert_eq!(
            stats.by_type.get(&ResourceType::Volume),
            Some(&TypeTally { accepted: 0, total: 1 })
        );
    }

    #[test]
    fn test_empty_batch_rates() {
        let stats = BatchStatistics::new();
        assert_eq!(stats.acceptance_rate(), 0.0);
        assert_eq!(stats.average_attempts(), 0.0);
    }

    #[test]
    fn test_statistics_serialize_with_named_keys() {
        let mut stats = BatchStatistics::new();
        stats.record(&accepted(ResourceType::Drive, 95.0));
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["tiers"]["excellent"], json!(1));
        assert_eq!(value["by_type"]["Drive"]["accepted"], json!(1));
    }
}
