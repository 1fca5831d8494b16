//! Scoring profiles
//!
//! Penalties, the presentation threshold and the severity policy shared by
//! both engines.

use serde::{Deserialize, Serialize};
use twin_core::{SeverityPolicy, TwinError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    /// Profile name (e.g., "standard@1.0")
    pub name: String,

    /// Points subtracted per error-severity finding
    pub error_penalty: f64,

    /// Points subtracted per warning-severity finding
    pub warning_penalty: f64,

    /// Minimum score for a compliant result to count as presentation-ready
    pub presentation_threshold: f64,

    pub severity: SeverityPolicy,
}

impl ScoringProfile {
    pub fn standard() -> Self {
        Self {
            name: "standard@1.0".to_string(),
            error_penalty: 10.0,
            warning_penalty: 3.0,
            presentation_threshold: 75.0,
            severity: SeverityPolicy::default(),
        }
    }

    /// Demo-quality bar: same penalties, stricter threshold
    pub fn showcase() -> Self {
        Self {
            name: "showcase@1.0".to_string(),
            presentation_threshold: 90.0,
            ..Self::standard()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TwinError> {
        let profile: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TwinError::Config(format!("invalid scoring profile: {}", e)))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Get profile by name; unknown names get the standard profile
    pub fn for_name(name: &str) -> Self {
        match name {
            "showcase" => Self::showcase(),
            _ => Self::standard(),
        }
    }

    pub fn validate(&self) -> Result<(), TwinError> {
        if !self.presentation_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.presentation_threshold)
        {
            return Err(TwinError::Config(format!(
                "presentation_threshold {} outside [0, 100]",
                self.presentation_threshold
            )));
        }
        let usable = |penalty: f64| penalty.is_finite() && penalty >= 0.0;
        if !(usable(self.error_penalty) && usable(self.warning_penalty)) {
            return Err(TwinError::Config(format!(
                "penalties must be finite and non-negative (error {}, warning {})",
                self.error_penalty, self.warning_penalty
            )));
        }
        Ok(())
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::standard()
    }
}
