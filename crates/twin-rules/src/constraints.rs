//! Field-level constraints: expected types, allowed values, numeric ranges,
//! and conditional (cross-field) requirements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    /// Any JSON number is accepted; generators routinely emit `8192.0`
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer | FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JSON type name of a value, for messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numbers compare by value (`512 == 512.0`), everything else structurally
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Allowed-set and/or numeric range for a field. Unset parts don't apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValueConstraint {
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            one_of: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            one_of: None,
            min,
            max,
        }
    }

    /// Returns a description of the violation, if any.
    ///
    /// Range bounds only apply to numbers; a non-numeric value is left to the
    /// type check.
    pub fn check(&self, value: &Value) -> Option<String> {
        if let Some(allowed) = &self.one_of {
            if !allowed.iter().any(|a| values_equal(a, value)) {
                return Some(format!(
                    "value {} not in allowed set [{}]",
                    value,
                    join_values(allowed)
                ));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    return Some(format!("value {} below minimum {}", value, min));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Some(format!("value {} above maximum {}", value, max));
                }
            }
        }

        None
    }

    /// Reject contradictory bounds and empty allowed sets
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(format!("min {} greater than max {}", min, max));
            }
        }
        if matches!(&self.one_of, Some(values) if values.is_empty()) {
            return Err("empty one_of set".to_string());
        }
        Ok(())
    }
}

fn join_values(values: &[Value]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// `when` half of a cross-field rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub field: String,
    pub equals: Value,
}

/// `then` half of a cross-field rule. With no `one_of`/`min`/`equals`,
/// the field merely has to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<Value>,
}

impl FieldRequirement {
    pub fn present(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            one_of: None,
            min: None,
            equals: None,
        }
    }

    /// Returns a description of how `value` fails the requirement
    pub fn check(&self, value: &Value) -> Option<String> {
        if let Some(allowed) = &self.one_of {
            if !allowed.iter().any(|a| values_equal(a, value)) {
                return Some(format!("should be one of [{}], got {}", join_values(allowed), value));
            }
        }
        if let Some(min) = self.min {
            match value.as_f64() {
                Some(n) if n >= min => {}
                _ => return Some(format!("should be at least {}, got {}", min, value)),
            }
        }
        if let Some(expected) = &self.equals {
            if !values_equal(expected, value) {
                return Some(format!("should be {}, got {}", expected, value));
            }
        }
        None
    }
}

/// Business rule: if `when` holds, `then` must be satisfied.
/// Violations are soft (warning severity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossFieldRule {
    pub when: FieldCondition,
    pub then: FieldRequirement,
}

impl CrossFieldRule {
    pub fn new(when_field: impl Into<String>, equals: impl Into<Value>, then: FieldRequirement) -> Self {
        Self {
            when: FieldCondition {
                field: when_field.into(),
                equals: equals.into(),
            },
            then,
        }
    }

    pub fn condition_holds(&self, actual: Option<&Value>) -> bool {
        actual.is_some_and(|v| values_equal(&self.when.equals, v))
    }
}
