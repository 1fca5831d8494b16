//! Compliance validator: rule engine + schema checker + scorer behind one call
use std::sync::Arc;
use twin_core::{CandidateArtifact, TwinError, ValidationFinding, ValidationResult};
use twin_quality::{ComplianceScorer, ScoringProfile};
use twin_rules::RuleCatalog;
use twin_schema::SchemaRegistry;

/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    rules: RuleCatalog,
    schemas: SchemaRegistry,
    scorer: ComplianceScorer,
}

impl ComplianceValidator {
    pub fn new(rules: RuleCatalog, schemas: SchemaRegistry, profile: ScoringProfile) -> Self {
        Self {
            rules,
            schemas,
            scorer: ComplianceScorer::new(profile),
        }
    }

    /// Built-in rule catalog and schemas
    pub fn redfish(profile: ScoringProfile) -> Result<Self, TwinError> {
        Ok(Self::new(RuleCatalog::redfish()?, SchemaRegistry::redfish()?, profile))
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn profile(&self) -> &ScoringProfile {
        self.scorer.profile()
    }

    pub fn rule_findings(&self, candidate: &CandidateArtifact) -> Vec<ValidationFinding> {
        match self.rules.rule_set_for(candidate.resource_type()) {
            Some(rules) => twin_rules::evaluate_with_policy(candidate, &rules, &self.profile().severity),
            None => vec![twin_rules::missing_rule_set(candidate.resource_type())],
        }
    }

    pub fn schema_findings(&self, candidate: &CandidateArtifact) -> Vec<ValidationFinding> {
        let schema = self.schemas.schema_for(candidate.resource_type());
        twin_schema::evaluate(candidate, schema.as_deref(), &self.profile().severity)
    }

    pub fn validate(&self, candidate: &CandidateArtifact) -> ValidationResult {
        let rule_findings = self.rule_findings(candidate);
        let schema_findings = self.schema_findings(candidate);
        self.scorer.score(&rule_findings, &schema_findings)
    }
}
