//! Severity policy shared by the rule engine and the schema checker
//!
//! Type drift is tolerated by default: a mismatched type is a warning unless
//! the field has been escalated explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::data_model::Severity;

/// Structural class of a schema violation, before severity is assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaViolationClass {
    /// A schema-required property is absent
    MissingRequired,
    /// A declared property holds a value of the wrong type
    TypeMismatch,
    /// Anything else: enum, pattern, bounds, nested shape
    Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPolicy {
    /// Field paths whose type mismatch is a hard failure
    #[serde(default)]
    pub escalated_type_fields: BTreeSet<String>,

    #[serde(default = "default_schema_type_severity")]
    pub schema_type_mismatch: Severity,
}

fn default_schema_type_severity() -> Severity {
    Severity::Warning
}

impl SeverityPolicy {
    pub fn escalate(mut self, path: impl Into<String>) -> Self {
        self.escalated_type_fields.insert(path.into());
        self
    }

    /// Severity of a rule-declared type mismatch at `path`
    pub fn type_mismatch_severity(&self, path: &str) -> Severity {
        if self.escalated_type_fields.contains(path) {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// Severity of a schema violation at `path`
    pub fn schema_severity(&self, class: SchemaViolationClass, path: &str) -> Severity {
        match class {
            SchemaViolationClass::MissingRequired | SchemaViolationClass::Shape => Severity::Error,
            SchemaViolationClass::TypeMismatch if self.escalated_type_fields.contains(path) => {
                Severity::Error
            }
            SchemaViolationClass::TypeMismatch => self.schema_type_mismatch,
        }
    }
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            escalated_type_fields: BTreeSet::new(),
            schema_type_mismatch: default_schema_type_severity(),
        }
    }
}
