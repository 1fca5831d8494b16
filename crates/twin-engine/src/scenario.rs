//! Scenario catalog
//!
//! Named sets of resource types to generate, with the mockup profiles the
//! generator should imitate. Passed explicitly to whoever expands them;
//! nothing here is global.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use twin_core::{ResourceType, TwinError};

use crate::batch::DeviceRequest;

static BUILTIN_SCENARIOS: &str = include_str!("../catalog/scenarios.yaml");

fn default_instances() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Candidate mockup profiles, in preference order
    #[serde(default)]
    pub profiles: Vec<String>,
    pub devices: Vec<ResourceType>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Average score the scenario is expected to reach
    pub target_score: f64,
    #[serde(default = "default_instances")]
    pub instances_per_type: u32,
    /// Per-type instance counts; types not listed use `instances_per_type`
    #[serde(default)]
    pub instance_counts: BTreeMap<ResourceType, u32>,
}

impl Scenario {
    /// One request per instance per device type, in declaration order
    pub fn requests(&self) -> Vec<DeviceRequest> {
        let mut requests = Vec::new();
        for &resource_type in &self.devices {
            let profile = select_profile(resource_type, &self.profiles);
            for instance_id in 1..=self.instances_for(resource_type) {
                let mut request = DeviceRequest::new(resource_type, instance_id);
                if let Some(profile) = profile {
                    request = request.with_profile(profile);
                }
                if !self.focus_areas.is_empty() {
                    request = request.with_hint(
                        "focus_areas",
                        Value::from(self.focus_areas.clone()),
                    );
                }
                requests.push(request);
            }
        }
        requests
    }

    pub fn instances_for(&self, resource_type: ResourceType) -> u32 {
        self.instance_counts
            .get(&resource_type)
            .copied()
            .unwrap_or(self.instances_per_type)
    }
}

/// Preferred mockup profiles per resource type
fn profile_priorities(resource_type: ResourceType) -> &'static [&'static str] {
    match resource_type {
        ResourceType::StorageController | ResourceType::Drive => {
            &["public-localstorage", "public-nvmeof-jbof"]
        }
        ResourceType::Volume => &["public-localstorage"],
        ResourceType::ComputerSystem => &["public-rackmount1", "public-bladed", "public-tower"],
        ResourceType::Processor | ResourceType::Memory | ResourceType::Manager => {
            &["public-rackmount1", "public-bladed"]
        }
        ResourceType::NetworkAdapter => &["public-smartnic", "public-sasfabric"],
        ResourceType::Chassis => &["public-rackmount1", "public-tower", "public-bladed"],
        _ => &[],
    }
}

/// First prioritized profile the scenario offers, else its first profile
pub fn select_profile(resource_type: ResourceType, available: &[String]) -> Option<&str> {
    profile_priorities(resource_type)
        .iter()
        .find_map(|wanted| available.iter().find(|p| p.as_str() == *wanted))
        .or_else(|| available.first())
        .map(String::as_str)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Scenario>,
}

impl ScenarioCatalog {
    pub fn builtin() -> Result<Self, TwinError> {
        Self::from_yaml(BUILTIN_SCENARIOS)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TwinError> {
        let catalog: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TwinError::Config(format!("invalid scenario catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TwinError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn get(&self, key: &str) -> Result<&Scenario, TwinError> {
        self.scenarios
            .get(key)
            .ok_or_else(|| TwinError::UnknownScenario(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn validate(&self) -> Result<(), TwinError> {
        for (key, scenario) in &self.scenarios {
            if scenario.devices.is_empty() {
                return Err(TwinError::Config(format!("scenario {} lists no devices", key)));
            }
            if let Some(extra) = scenario
                .instance_counts
                .keys()
                .find(|rt| !scenario.devices.contains(*rt))
            {
                return Err(TwinError::Config(format!(
                    "scenario {} counts instances of {}, which it does not list",
                    key, extra
                )));
            }
            if !(0.0..=100.0).contains(&scenario.target_score) {
                return Err(TwinError::Config(format!(
                    "scenario {} target_score {} outside [0, 100]",
                    key, scenario.target_score
                )));
            }
        }
        Ok(())
    }
}
