//! Integration tests for twin-schema against the shared fixture schemas.

use serde_json::json;
use twin_core::{CandidateArtifact, ResourceType, Severity, SeverityPolicy};
use twin_schema::{evaluate, SchemaRegistry};

const SCHEMAS_PATH: &str = "testing/fixtures/catalog/schemas.json";
const EXTENSIONS_PATH: &str = "testing/fixtures/catalog/swordfish_extensions.json";

fn fixture(relative: &str) -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(relative)
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::from_path(fixture(SCHEMAS_PATH)).unwrap();
    registry.merge_path(fixture(EXTENSIONS_PATH)).unwrap();
    registry
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_extensions_merge_into_base_map() {
    let registry = registry();
    let types: Vec<_> = registry.resource_types().collect();
    assert_eq!(types, vec![ResourceType::Drive, ResourceType::StoragePool]);
}

// =============================================================================
// Checking
// =============================================================================

#[test]
fn test_missing_status_is_an_error() {
    let registry = registry();
    let schema = registry.schema_for(ResourceType::Drive);
    let candidate = CandidateArtifact::new(ResourceType::Drive, json!({ "Id": "1", "Name": "Drive 1" }));

    let findings = evaluate(&candidate, schema.as_deref(), &SeverityPolicy::default());

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "Status");
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_wrong_capacity_type_is_a_warning() {
    let registry = registry();
    let schema = registry.schema_for(ResourceType::Drive);
    let candidate = CandidateArtifact::new(
        ResourceType::Drive,
        json!({
            "Id": "1",
            "Name": "Drive 1",
            "CapacityBytes": "a lot",
            "Status": { "State": "Enabled" }
        }),
    );

    let findings = evaluate(&candidate, schema.as_deref(), &SeverityPolicy::default());

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].path, "CapacityBytes");
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[test]
fn test_unregistered_type_fails_closed() {
    let registry = registry();
    let schema = registry.schema_for(ResourceType::Fabric);
    let candidate = CandidateArtifact::new(ResourceType::Fabric, json!({ "Id": "f1", "Name": "Fabric" }));

    let findings = evaluate(&candidate, schema.as_deref(), &SeverityPolicy::default());

    assert_eq!(findings.len(), 1);
    assert!(findings[0].is_error());
}

#[test]
fn test_extension_schema_applies() {
    let registry = registry();
    let schema = registry.schema_for(ResourceType::StoragePool);
    let candidate = CandidateArtifact::new(
        ResourceType::StoragePool,
        json!({ "Id": "p1", "Name": "Pool", "Capacity": {} }),
    );

    assert!(evaluate(&candidate, schema.as_deref(), &SeverityPolicy::default()).is_empty());
}
