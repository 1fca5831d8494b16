//! Engine configuration
//!
//! YAML file first, then `TWIN_*` environment overrides, then validation.
//!
//! ```yaml
//! orchestrator:
//!   retry_budget: 3
//!   strictness: presentation_ready
//!   call_timeout_ms: 30000
//! scoring:
//!   presentation_threshold: 80
//! concurrency: 4
//! schema_extensions: [schemas/swordfish.json]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use twin_core::TwinError;
use twin_quality::ScoringProfile;
use twin_rules::RuleCatalog;
use twin_schema::SchemaRegistry;

use crate::orchestrator::OrchestratorConfig;
use crate::scenario::ScenarioCatalog;
use crate::validator::ComplianceValidator;

pub const ENV_RETRY_BUDGET: &str = "TWIN_RETRY_BUDGET";
pub const ENV_PRESENTATION_THRESHOLD: &str = "TWIN_PRESENTATION_THRESHOLD";
pub const ENV_STRICTNESS: &str = "TWIN_STRICTNESS";
pub const ENV_CALL_TIMEOUT_SECS: &str = "TWIN_CALL_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "TWIN_CONCURRENCY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub orchestrator: OrchestratorConfig,

    pub scoring: ScoringProfile,

    /// Device requests in flight at once
    pub concurrency: usize,

    /// Rule catalog file; built-in rules when unset
    pub rules_path: Option<PathBuf>,

    /// Schema map file; built-in schemas when unset
    pub schemas_path: Option<PathBuf>,

    /// Schema maps merged on top, in order
    pub schema_extensions: Vec<PathBuf>,

    /// Scenario catalog file; built-in scenarios when unset
    pub scenarios_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            scoring: ScoringProfile::standard(),
            concurrency: 4,
            rules_path: None,
            schemas_path: None,
            schema_extensions: Vec::new(),
            scenarios_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, TwinError> {
        serde_yaml::from_str(yaml).map_err(|e| TwinError::Config(format!("invalid engine config: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TwinError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Apply `TWIN_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self, TwinError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, TwinError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_RETRY_BUDGET) {
            self.orchestrator.retry_budget = parse_var(ENV_RETRY_BUDGET, &value)?;
        }
        if let Some(value) = lookup(ENV_PRESENTATION_THRESHOLD) {
            self.scoring.presentation_threshold = parse_var(ENV_PRESENTATION_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_STRICTNESS) {
            self.orchestrator.strictness = parse_var(ENV_STRICTNESS, &value)?;
        }
        if let Some(value) = lookup(ENV_CALL_TIMEOUT_SECS) {
            let secs: u64 = parse_var(ENV_CALL_TIMEOUT_SECS, &value)?;
            self.orchestrator.call_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_var(ENV_CONCURRENCY, &value)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), TwinError> {
        self.orchestrator.validate()?;
        self.scoring.validate()?;
        if self.concurrency == 0 {
            return Err(TwinError::Config("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load rule and schema sources and wrap them with the scoring profile
    pub fn build_validator(&self) -> Result<ComplianceValidator, TwinError> {
        let rules = match &self.rules_path {
            Some(path) => RuleCatalog::from_path(path)?,
            None => RuleCatalog::redfish()?,
        };
        let mut schemas = match &self.schemas_path {
            Some(path) => SchemaRegistry::from_path(path)?,
            None => SchemaRegistry::redfish()?,
        };
        for extension in &self.schema_extensions {
            schemas.merge_path(extension)?;
        }
        Ok(ComplianceValidator::new(rules, schemas, self.scoring.clone()))
    }

    pub fn scenario_catalog(&self) -> Result<ScenarioCatalog, TwinError> {
        match &self.scenarios_path {
            Some(path) => ScenarioCatalog::from_path(path),
            None => ScenarioCatalog::builtin(),
        }
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, TwinError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TwinError::Config(format!("{}={:?}: {}", name, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Strictness;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.orchestrator.retry_budget, 3);
        assert_eq!(config.scoring.presentation_threshold, 75.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_config() {
        let yaml = "orchestrator:\n  retry_budget: 5\n  strictness: presentation_ready\nconcurrency: 8\n";
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.orchestrator.retry_budget, 5);
        assert_eq!(config.orchestrator.strictness, Strictness::PresentationReady);
        assert_eq!(config.orchestrator.call_timeout_ms, 30_000);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(EngineConfig::from_yaml("retries: 3\n").is_err());
    }

    #[test]
    fn test_overrides() {
        let env = vars(&[
            (ENV_RETRY_BUDGET, "5"),
            (ENV_PRESENTATION_THRESHOLD, "90"),
            (ENV_STRICTNESS, "presentation_ready"),
            (ENV_CALL_TIMEOUT_SECS, "2"),
            (ENV_CONCURRENCY, "16"),
        ]);
        let config = EngineConfig::default()
            .with_overrides(|name| env.get(name).cloned())
            .unwrap();

        assert_eq!(config.orchestrator.retry_budget, 5);
        assert_eq!(config.scoring.presentation_threshold, 90.0);
        assert_eq!(config.orchestrator.strictness, Strictness::PresentationReady);
        assert_eq!(config.orchestrator.call_timeout_ms, 2_000);
        assert_eq!(config.concurrency, 16);
    }

    #[test]
    fn test_bad_override_names_the_variable() {
        let env = vars(&[(ENV_RETRY_BUDGET, "three")]);
        let err = EngineConfig::default()
            .with_overrides(|name| env.get(name).cloned())
            .unwrap_err();
        assert!(err.to_string().contains(ENV_RETRY_BUDGET));
    }

    #[test]
    fn test_validate_rejects_zero_budget_and_concurrency() {
        let env = vars(&[(ENV_RETRY_BUDGET, "0")]);
        let config = EngineConfig::default()
            .with_overrides(|name| env.get(name).cloned())
            .unwrap();
        assert!(config.validate().is_err());

        let config = EngineConfig {
            concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builtin_sources_load() {
        let config = EngineConfig::default();
        assert!(config.build_validator().is_ok());
        assert_eq!(config.scenario_catalog().unwrap().len(), 7);
    }
}
