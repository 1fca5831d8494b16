//! Rule evaluation
//!
//! Findings come out in a fixed order: required fields (rule-set order),
//! then types, then value constraints (both by path), then cross-field rules,
//! then missing highlight fields.

use serde_json::Value;
use twin_core::{CandidateArtifact, FindingKind, ResourceType, SeverityPolicy, ValidationFinding};

use crate::constraints::json_type_name;
use crate::rule_set::RuleSet;

/// Evaluate a candidate under the default severity policy
pub fn evaluate(candidate: &CandidateArtifact, rules: &RuleSet) -> Vec<ValidationFinding> {
    evaluate_with_policy(candidate, rules, &SeverityPolicy::default())
}

/// Evaluate a candidate; `policy` decides which type mismatches are errors
pub fn evaluate_with_policy(
    candidate: &CandidateArtifact,
    rules: &RuleSet,
    policy: &SeverityPolicy,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    // === Required fields ===
    for path in &rules.required {
        if candidate.get(path).is_none() {
            findings.push(ValidationFinding::error(
                FindingKind::MissingRequired,
                path.as_str(),
                format!("missing required field for {}: {}", rules.resource_type, path),
            ));
        }
    }

    // === Types ===
    for (path, expected) in &rules.field_types {
        let Some(value) = present_value(candidate, rules, path) else {
            continue;
        };
        if !expected.matches(value) {
            findings.push(ValidationFinding::new(
                policy.type_mismatch_severity(path),
                FindingKind::WrongType,
                path.as_str(),
                format!(
                    "field {} should be {}, got {}",
                    path,
                    expected,
                    json_type_name(value)
                ),
            ));
        }
    }

    // === Value constraints ===
    for (path, constraint) in &rules.constraints {
        let Some(value) = present_value(candidate, rules, path) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Some(problem) = constraint.check(value) {
            findings.push(ValidationFinding::error(
                FindingKind::ConstraintViolated,
                path.as_str(),
                format!("invalid {}: {}", path, problem),
            ));
        }
    }

    // === Cross-field business rules ===
    for rule in &rules.cross_field {
        if !rule.condition_holds(candidate.get(&rule.when.field)) {
            continue;
        }
        let target = &rule.then.field;
        let problem = match candidate.get(target) {
            None => Some("is required".to_string()),
            Some(value) => rule.then.check(value),
        };
        if let Some(problem) = problem {
            findings.push(ValidationFinding::warning(
                FindingKind::ConstraintViolated,
                target.as_str(),
                format!(
                    "{} {} when {} is {}",
                    target, problem, rule.when.field, rule.when.equals
                ),
            ));
        }
    }

    // === Presentation highlights ===
    for path in &rules.highlight_fields {
        if candidate.get(path).is_none() {
            findings.push(ValidationFinding::warning(
                FindingKind::MissingHighlight,
                path.as_str(),
                format!("consider adding {} for presentation", path),
            ));
        }
    }

    findings
}

/// The value at `path`, unless absent or a null in an optional field
fn present_value<'a>(
    candidate: &'a CandidateArtifact,
    rules: &RuleSet,
    path: &str,
) -> Option<&'a Value> {
    match candidate.get(path) {
        None => None,
        Some(Value::Null) if !rules.is_required(path) => None,
        Some(value) => Some(value),
    }
}

/// Fail-closed finding for a resource type with no rule set
pub fn missing_rule_set(resource_type: ResourceType) -> ValidationFinding {
    ValidationFinding::error(
        FindingKind::MissingRequired,
        "$",
        format!("no rule set available for {}", resource_type),
    )
}
