//! Per-resource-type rule set
//!
//! Built once (from a catalog or in code) and shared read-only by every
//! evaluation for that resource type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use twin_core::ResourceType;

use crate::constraints::{CrossFieldRule, FieldType, ValueConstraint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub resource_type: ResourceType,

    /// Required field paths, in reporting order, without duplicates
    pub required: Vec<String>,

    pub field_types: BTreeMap<String, FieldType>,

    pub constraints: BTreeMap<String, ValueConstraint>,

    #[serde(default)]
    pub cross_field: Vec<CrossFieldRule>,

    /// Optional fields that make a document presentable; absence is a warning
    #[serde(default)]
    pub highlight_fields: Vec<String>,
}

impl RuleSet {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            required: Vec::new(),
            field_types: BTreeMap::new(),
            constraints: BTreeMap::new(),
            cross_field: Vec::new(),
            highlight_fields: Vec::new(),
        }
    }

    /// Add a required field path (ignored if already required)
    pub fn require(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.required.contains(&path) {
            self.required.push(path);
        }
        self
    }

    pub fn field_type(mut self, path: impl Into<String>, ty: FieldType) -> Self {
        self.field_types.insert(path.into(), ty);
        self
    }

    pub fn constrain(mut self, path: impl Into<String>, constraint: ValueConstraint) -> Self {
        self.constraints.insert(path.into(), constraint);
        self
    }

    pub fn cross_field(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field.push(rule);
        self
    }

    /// Add a highlight field (ignored if already listed)
    pub fn highlight(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.highlight_fields.contains(&path) {
            self.highlight_fields.push(path);
        }
        self
    }

    pub fn is_required(&self, path: &str) -> bool {
        self.required.iter().any(|r| r == path)
    }

    /// Check internal consistency (range bounds, empty allowed sets)
    pub fn validate(&self) -> Result<(), String> {
        for (path, constraint) in &self.constraints {
            constraint
                .validate()
                .map_err(|e| format!("{}.{}: {}", self.resource_type, path, e))?;
        }
        Ok(())
    }
}
