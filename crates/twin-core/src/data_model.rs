//! Data Model: ResourceType, CandidateArtifact, findings, attempts
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::TwinError;

/// Kind of device resource. Closed catalog shared by rules and schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    StorageController,
    Drive,
    Volume,
    StoragePool,
    ComputerSystem,
    Processor,
    Memory,
    NetworkAdapter,
    Chassis,
    Manager,
    Fabric,
    Switch,
    Port,
}

impl ResourceType {
    pub const ALL: [ResourceType; 13] = [
        ResourceType::StorageController,
        ResourceType::Drive,
        ResourceType::Volume,
        ResourceType::StoragePool,
        ResourceType::ComputerSystem,
        ResourceType::Processor,
        ResourceType::Memory,
        ResourceType::NetworkAdapter,
        ResourceType::Chassis,
        ResourceType::Manager,
        ResourceType::Fabric,
        ResourceType::Switch,
        ResourceType::Port,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::StorageController => "StorageController",
            ResourceType::Drive => "Drive",
            ResourceType::Volume => "Volume",
            ResourceType::StoragePool => "StoragePool",
            ResourceType::ComputerSystem => "ComputerSystem",
            ResourceType::Processor => "Processor",
            ResourceType::Memory => "Memory",
            ResourceType::NetworkAdapter => "NetworkAdapter",
            ResourceType::Chassis => "Chassis",
            ResourceType::Manager => "Manager",
            ResourceType::Fabric => "Fabric",
            ResourceType::Switch => "Switch",
            ResourceType::Port => "Port",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = TwinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_' && *c != ' ').collect();
        ResourceType::ALL
            .iter()
            .copied()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| TwinError::UnknownResourceType(s.to_string()))
    }
}

/// Resolve a dotted field path inside a document.
///
/// Keys may themselves contain dots (`@odata.type`), so the remaining path is
/// tried as a literal key before each split point. Array elements are
/// addressed by index.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(found) = child(value, path) {
        return Some(found);
    }
    for (idx, _) in path.match_indices('.') {
        let (head, tail) = (&path[..idx], &path[idx + 1..]);
        if let Some(found) = child(value, head).and_then(|c| lookup(c, tail)) {
            return Some(found);
        }
    }
    None
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Rebuild a value with object keys in sorted order, whatever map backend
/// serde_json was compiled with.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// One generated document. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateArtifact {
    resource_type: ResourceType,
    document: Value,
    digest: String,
}

impl CandidateArtifact {
    pub fn new(resource_type: ResourceType, document: Value) -> Self {
        let canonical = canonicalize(&document).to_string();
        let digest = format!("blake3:{}", blake3::hash(canonical.as_bytes()));
        Self {
            resource_type,
            document,
            digest,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Content digest over the serialized document (`blake3:<hex>`)
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.document, path)
    }

    pub fn into_document(self) -> Value {
        self.document
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    MissingRequired,
    WrongType,
    ConstraintViolated,
    SchemaViolation,
    /// An optional presentation field is absent
    MissingHighlight,
}

/// A single discrepancy between a candidate and its rules or schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// Dotted field path, `$` for the document itself
    pub path: String,
    pub message: String,
}

impl ValidationFinding {
    pub fn new(
        severity: Severity,
        kind: FindingKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn error(kind: FindingKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, path, message)
    }

    pub fn warning(kind: FindingKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, path, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} [{}]: {}", level, self.path, self.message)
    }
}

/// Scored outcome of validating one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_compliant: bool,
    /// 0.0 to 100.0
    pub score: f64,
    pub findings: Vec<ValidationFinding>,
    pub is_presentation_ready: bool,
}

impl ValidationResult {
    /// Result recorded for an attempt that produced no candidate at all
    pub fn generation_failure(message: impl fmt::Display) -> Self {
        Self {
            is_compliant: false,
            score: 0.0,
            findings: vec![ValidationFinding::error(
                FindingKind::SchemaViolation,
                "$",
                format!("generation failed: {}", message),
            )],
            is_presentation_ready: false,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

/// One iteration of the generate-validate loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    /// 1-based, no gaps
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub latency_ms: u64,
    /// Absent when the generator failed or returned something unparsable
    pub candidate: Option<CandidateArtifact>,
    pub result: ValidationResult,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Terminal state of one device request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Accepted {
        attempt_number: u32,
        artifact: CandidateArtifact,
        result: ValidationResult,
    },
    /// Retry budget spent. Carries the best attempt as a best-effort artifact;
    /// its result is always marked non-compliant.
    Exhausted {
        best_attempt: Option<u32>,
        artifact: Option<CandidateArtifact>,
        result: ValidationResult,
    },
}

impl GenerationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GenerationOutcome::Accepted { .. })
    }

    pub fn result(&self) -> &ValidationResult {
        match self {
            GenerationOutcome::Accepted { result, .. } => result,
            GenerationOutcome::Exhausted { result, .. } => result,
        }
    }

    pub fn artifact(&self) -> Option<&CandidateArtifact> {
        match self {
            GenerationOutcome::Accepted { artifact, .. } => Some(artifact),
            GenerationOutcome::Exhausted { artifact, .. } => artifact.as_ref(),
        }
    }
}

/// Everything known about one device request once it terminates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub resource_type: ResourceType,
    pub instance_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub attempts: Vec<GenerationAttempt>,
    pub outcome: GenerationOutcome,
}

impl GenerationReport {
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_accepted()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn final_score(&self) -> f64 {
        self.outcome.result().score
    }

    /// Attempts that produced no candidate
    pub fn generation_failures(&self) -> usize {
        self.attempts.iter().filter(|a| a.candidate.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_type_parsing() {
        assert_eq!("Drive".parse::<ResourceType>().unwrap(), ResourceType::Drive);
        assert_eq!(
            "storage_controller".parse::<ResourceType>().unwrap(),
            ResourceType::StorageController
        );
        assert!("Toaster".parse::<ResourceType>().is_err());
    }

    #[test]
    fn test_lookup_literal_dotted_key() {
        let doc = json!({
            "@odata.type": "#Drive.v1_0_0.Drive",
            "Status": { "State": "Enabled" },
            "Links": { "Members": [{ "@odata.id": "/redfish/v1/1" }] }
        });

        assert_eq!(lookup(&doc, "@odata.type"), Some(&json!("#Drive.v1_0_0.Drive")));
        assert_eq!(lookup(&doc, "Status.State"), Some(&json!("Enabled")));
        assert_eq!(
            lookup(&doc, "Links.Members.0.@odata.id"),
            Some(&json!("/redfish/v1/1"))
        );
        assert_eq!(lookup(&doc, "Status.Health"), None);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = CandidateArtifact::new(ResourceType::Drive, json!({"Id": "1", "Name": "d"}));
        let b = CandidateArtifact::new(ResourceType::Drive, json!({"Name": "d", "Id": "1"}));
        assert_eq!(a.digest(), b.digest());
        assert!(a.digest().starts_with("blake3:"));
    }

    #[test]
    fn test_generation_failure_result() {
        let result = ValidationResult::generation_failure("timeout");
        assert!(!result.is_compliant);
        assert!(!result.is_presentation_ready);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.error_count(), 1);
    }
}
