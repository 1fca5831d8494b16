//! Rule catalog: declarative rule files turned into shared rule sets
//!
//! A catalog file has a `defaults` block applied to every resource type and
//! optional per-type blocks layered on top:
//!
//! ```yaml
//! defaults:
//!   required: ["@odata.type", "@odata.id", Id, Name]
//!   constraints:
//!     Status.Health: { one_of: [OK, Warning, Critical] }
//! resources:
//!   Drive:
//!     required: [CapacityBytes]
//!     field_types: { CapacityBytes: integer }
//!     highlight_fields: [Manufacturer, Model]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use twin_core::{ResourceType, TwinError};

use crate::constraints::{CrossFieldRule, FieldType, ValueConstraint};
use crate::rule_set::RuleSet;

static REDFISH_RULES: &str = include_str!("../catalog/redfish.yaml");

/// One block of a catalog file, before merging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetSpec {
    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default)]
    pub field_types: BTreeMap<String, FieldType>,

    #[serde(default)]
    pub constraints: BTreeMap<String, ValueConstraint>,

    #[serde(default)]
    pub cross_field: Vec<CrossFieldRule>,

    #[serde(default)]
    pub highlight_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    defaults: Option<RuleSetSpec>,

    #[serde(default)]
    resources: BTreeMap<ResourceType, RuleSetSpec>,
}

/// Read-only lookup of merged rule sets by resource type
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    sets: BTreeMap<ResourceType, Arc<RuleSet>>,
}

impl RuleCatalog {
    /// Empty catalog: every lookup misses
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in Redfish/Swordfish rules
    pub fn redfish() -> Result<Self, TwinError> {
        Self::from_yaml(REDFISH_RULES)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TwinError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| TwinError::RuleCatalog(format!("invalid rule catalog: {}", e)))?;
        Self::build(file)
    }

    pub fn from_json(json: &str) -> Result<Self, TwinError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| TwinError::RuleCatalog(format!("invalid rule catalog: {}", e)))?;
        Self::build(file)
    }

    /// Load from disk; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TwinError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Add or replace a rule set built in code
    pub fn insert(&mut self, rules: RuleSet) -> Result<(), TwinError> {
        rules.validate().map_err(TwinError::RuleCatalog)?;
        self.sets.insert(rules.resource_type, Arc::new(rules));
        Ok(())
    }

    pub fn rule_set_for(&self, resource_type: ResourceType) -> Option<Arc<RuleSet>> {
        self.sets.get(&resource_type).cloned()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.sets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn build(file: CatalogFile) -> Result<Self, TwinError> {
        let mut catalog = Self::new();

        // Defaults cover every type; without them only listed types exist.
        let types: Vec<ResourceType> = if file.defaults.is_some() {
            ResourceType::ALL.to_vec()
        } else {
            file.resources.keys().copied().collect()
        };

        for resource_type in types {
            let mut rules = RuleSet::new(resource_type);
            if let Some(defaults) = &file.defaults {
                rules = apply(rules, defaults);
            }
            if let Some(specific) = file.resources.get(&resource_type) {
                rules = apply(rules, specific);
            }
            catalog.insert(rules)?;
        }

        Ok(catalog)
    }
}

/// Layer a spec onto a rule set; later layers win on conflicting paths
fn apply(mut rules: RuleSet, spec: &RuleSetSpec) -> RuleSet {
    for path in &spec.required {
        rules = rules.require(path.clone());
    }
    for (path, ty) in &spec.field_types {
        rules.field_types.insert(path.clone(), *ty);
    }
    for (path, constraint) in &spec.constraints {
        rules.constraints.insert(path.clone(), constraint.clone());
    }
    rules.cross_field.extend(spec.cross_field.iter().cloned());
    for path in &spec.highlight_fields {
        rules = rules.highlight(path.clone());
    }
    rules
}
