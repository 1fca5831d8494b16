//! Schema checking
//!
//! Every violation becomes a `schema-violation` finding. Severity comes from
//! the [`SeverityPolicy`]: missing properties and shape violations are
//! errors, type mismatches are warnings unless escalated.

use jsonschema::error::ValidationErrorKind;
use twin_core::{
    CandidateArtifact, FindingKind, SchemaViolationClass, SeverityPolicy, ValidationFinding,
};

use crate::registry::CompiledSchema;

/// Check a candidate against its schema. No schema means one error finding.
pub fn evaluate(
    candidate: &CandidateArtifact,
    schema: Option<&CompiledSchema>,
    policy: &SeverityPolicy,
) -> Vec<ValidationFinding> {
    let Some(schema) = schema else {
        return vec![missing_schema()];
    };

    schema
        .validator()
        .iter_errors(candidate.document())
        .map(|err| {
            let base = pointer_to_path(&err.instance_path.to_string());
            let (class, path) = match &err.kind {
                ValidationErrorKind::Required { property } => {
                    let name = property
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| property.to_string());
                    (SchemaViolationClass::MissingRequired, join_path(&base, &name))
                }
                ValidationErrorKind::Type { .. } => (SchemaViolationClass::TypeMismatch, base),
                _ => (SchemaViolationClass::Shape, base),
            };
            ValidationFinding::new(
                policy.schema_severity(class, &path),
                FindingKind::SchemaViolation,
                path,
                err.to_string(),
            )
        })
        .collect()
}

/// Fail-closed finding for a resource type with no schema
pub fn missing_schema() -> ValidationFinding {
    ValidationFinding::error(FindingKind::SchemaViolation, "$", "no schema available")
}

/// `/Status/Health` → `Status.Health`; the empty pointer is the document, `$`
pub fn pointer_to_path(pointer: &str) -> String {
    let segments: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    if segments.is_empty() {
        "$".to_string()
    } else {
        segments.join(".")
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base == "$" {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}
