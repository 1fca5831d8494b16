//! Simulated device operations
//!
//! An operation moves a device into a new power or service state. The source
//! artifact is never touched: the result is a new artifact with its own digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use twin_core::{CandidateArtifact, TwinError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOperation {
    PowerOn,
    PowerOff,
    Reset,
    Maintenance,
    Test,
}

impl DeviceOperation {
    pub const ALL: [DeviceOperation; 5] = [
        DeviceOperation::PowerOn,
        DeviceOperation::PowerOff,
        DeviceOperation::Reset,
        DeviceOperation::Maintenance,
        DeviceOperation::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceOperation::PowerOn => "power_on",
            DeviceOperation::PowerOff => "power_off",
            DeviceOperation::Reset => "reset",
            DeviceOperation::Maintenance => "maintenance",
            DeviceOperation::Test => "test",
        }
    }

    /// `Status.State` and `Status.Health` after the operation
    pub fn target_status(&self) -> (&'static str, &'static str) {
        match self {
            DeviceOperation::PowerOn | DeviceOperation::Reset => ("Enabled", "OK"),
            DeviceOperation::PowerOff => ("Disabled", "OK"),
            DeviceOperation::Maintenance => ("StandbyOffline", "Warning"),
            DeviceOperation::Test => ("InTest", "OK"),
        }
    }

    /// `PowerState` after the operation, for resources that report one
    pub fn power_state(&self) -> Option<&'static str> {
        match self {
            DeviceOperation::PowerOn | DeviceOperation::Reset => Some("On"),
            DeviceOperation::PowerOff => Some("Off"),
            DeviceOperation::Maintenance | DeviceOperation::Test => None,
        }
    }
}

impl fmt::Display for DeviceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceOperation {
    type Err = TwinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        DeviceOperation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| TwinError::Operation(format!("unknown operation: {}", s)))
    }
}

/// Apply `operation` now
pub fn apply_operation(
    artifact: &CandidateArtifact,
    operation: DeviceOperation,
) -> Result<CandidateArtifact, TwinError> {
    apply_operation_at(artifact, operation, Utc::now())
}

/// Apply `operation` as of `at` (stamped into `LastResetTime` on reset)
pub fn apply_operation_at(
    artifact: &CandidateArtifact,
    operation: DeviceOperation,
    at: DateTime<Utc>,
) -> Result<CandidateArtifact, TwinError> {
    let mut document = artifact.document().clone();
    let fields = document.as_object_mut().ok_or_else(|| {
        TwinError::Operation(format!(
            "cannot {} {}: document is not an object",
            operation,
            artifact.resource_type()
        ))
    })?;

    let (state, health) = operation.target_status();
    let status = fields
        .entry("Status")
        .or_insert_with(|| Value::Object(Map::new()));
    if !status.is_object() {
        *status = Value::Object(Map::new());
    }
    if let Some(status) = status.as_object_mut() {
        status.insert("State".to_string(), Value::from(state));
        status.insert("Health".to_string(), Value::from(health));
    }

    if let Some(power) = operation.power_state() {
        if fields.contains_key("PowerState") {
            fields.insert("PowerState".to_string(), Value::from(power));
        }
    }

    if operation == DeviceOperation::Reset {
        fields.insert(
            "LastResetTime".to_string(),
            Value::String(at.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        );
    }

    tracing::debug!(
        resource_type = %artifact.resource_type(),
        operation = %operation,
        state,
        health,
        "operation applied"
    );

    Ok(CandidateArtifact::new(artifact.resource_type(), document))
}
