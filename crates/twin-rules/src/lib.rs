//! Twin Rules: declarative field rules for device resources
//!
//! The rule engine checks a candidate document against a [`RuleSet`]
//! independently of any formal schema:
//!
//! ```text
//! candidate ─┬─ required fields  → missing-required   (error)
//!            ├─ field types      → wrong-type         (warning unless escalated)
//!            ├─ value constraints→ constraint-violated(error)
//!            └─ cross-field rules→ constraint-violated(warning)
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use twin_core::{CandidateArtifact, ResourceType};
//! use twin_rules::{evaluate, RuleSet};
//!
//! let rules = RuleSet::new(ResourceType::Drive).require("Id").require("Name");
//! let candidate = CandidateArtifact::new(ResourceType::Drive, json!({ "Id": "1" }));
//!
//! let findings = evaluate(&candidate, &rules);
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].path, "Name");
//! ```

pub mod catalog;
pub mod constraints;
pub mod engine;
pub mod rule_set;

pub use catalog::{RuleCatalog, RuleSetSpec};
pub use constraints::{json_type_name, CrossFieldRule, FieldCondition, FieldRequirement, FieldType, ValueConstraint};
pub use engine::{evaluate, evaluate_with_policy, missing_rule_set};
pub use rule_set::RuleSet;
