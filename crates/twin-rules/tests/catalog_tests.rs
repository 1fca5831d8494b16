//! Integration tests for twin-rules against the shared fixture catalog.

use serde_json::json;
use twin_core::{CandidateArtifact, FindingKind, ResourceType, Severity};
use twin_rules::{evaluate, RuleCatalog};

/// Path to the fixture catalog relative to the workspace root
const RULES_PATH: &str = "testing/fixtures/catalog/rules.yaml";

fn rules_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(RULES_PATH)
}

fn catalog() -> RuleCatalog {
    RuleCatalog::from_path(rules_path()).unwrap()
}

// =============================================================================
// Required fields
// =============================================================================

#[test]
fn test_missing_name_scores_one_error() {
    let rules = catalog().rule_set_for(ResourceType::Chassis).unwrap();
    let candidate = CandidateArtifact::new(ResourceType::Chassis, json!({ "Id": "1" }));

    let findings = evaluate(&candidate, &rules);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::MissingRequired);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(findings[0].path, "Name");
}

#[test]
fn test_complete_drive_has_no_findings() {
    let rules = catalog().rule_set_for(ResourceType::Drive).unwrap();
    let candidate = CandidateArtifact::new(
        ResourceType::Drive,
        json!({
            "Id": "1",
            "Name": "Drive 1",
            "CapacityBytes": 1_000_000_000_000u64,
            "MediaType": "HDD",
            "RotationSpeedRPM": 7200,
            "Status": { "State": "Enabled", "Health": "OK" }
        }),
    );

    assert!(evaluate(&candidate, &rules).is_empty());
}

// =============================================================================
// Soft findings
// =============================================================================

#[test]
fn test_type_drift_never_errors() {
    let rules = catalog().rule_set_for(ResourceType::Drive).unwrap();
    let candidate = CandidateArtifact::new(
        ResourceType::Drive,
        json!({ "Id": 1, "Name": 2, "CapacityBytes": "1TB" }),
    );

    let findings = evaluate(&candidate, &rules);

    assert_eq!(findings.len(), 3);
    assert!(findings.iter().all(|f| f.severity == Severity::Warning));
}

#[test]
fn test_slow_hdd_is_a_business_warning() {
    let rules = catalog().rule_set_for(ResourceType::Drive).unwrap();
    let candidate = CandidateArtifact::new(
        ResourceType::Drive,
        json!({
            "Id": "1",
            "Name": "Drive 1",
            "CapacityBytes": 10,
            "MediaType": "HDD",
            "RotationSpeedRPM": 4200
        }),
    );

    let findings = evaluate(&candidate, &rules);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(findings[0].kind, FindingKind::ConstraintViolated);
}

#[test]
fn test_bad_health_is_a_hard_failure() {
    let rules = catalog().rule_set_for(ResourceType::Drive).unwrap();
    let candidate = CandidateArtifact::new(
        ResourceType::Drive,
        json!({
            "Id": "1",
            "Name": "Drive 1",
            "CapacityBytes": 10,
            "Status": { "Health": "Smoking" }
        }),
    );

    let findings = evaluate(&candidate, &rules);

    assert_eq!(findings.len(), 1);
    assert!(findings[0].is_error());
    assert_eq!(findings[0].path, "Status.Health");
}
