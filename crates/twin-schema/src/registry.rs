//! Schema registry: resource type → compiled JSON Schema
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use twin_core::{ResourceType, TwinError};

static REDFISH_SCHEMAS: &str = include_str!("../catalog/redfish.json");

/// A schema document together with its compiled validator
pub struct CompiledSchema {
    resource_type: ResourceType,
    source: Value,
    validator: Validator,
}

impl CompiledSchema {
    pub fn compile(resource_type: ResourceType, source: Value) -> Result<Self, TwinError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&source)
            .map_err(|e| TwinError::Schema(format!("invalid schema for {}: {}", resource_type, e)))?;
        Ok(Self {
            resource_type,
            source,
            validator,
        })
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("resource_type", &self.resource_type)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Read-only lookup of compiled schemas. Built once, shared across tasks.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<ResourceType, Arc<CompiledSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in Redfish/Swordfish schemas
    pub fn redfish() -> Result<Self, TwinError> {
        Self::from_json(REDFISH_SCHEMAS)
    }

    /// Parse a JSON object of `{ "<ResourceType>": <schema>, ... }`
    pub fn from_json(json: &str) -> Result<Self, TwinError> {
        let mut registry = Self::new();
        registry.merge_json(json)?;
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TwinError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Layer another schema map on top; entries for the same type are replaced
    pub fn merge_json(&mut self, json: &str) -> Result<(), TwinError> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| TwinError::Schema(format!("invalid schema map: {}", e)))?;

        for (key, source) in entries {
            let resource_type: ResourceType = key
                .parse()
                .map_err(|_| TwinError::Schema(format!("unknown resource type in schema map: {}", key)))?;
            self.insert(resource_type, source)?;
        }
        Ok(())
    }

    pub fn merge_path(&mut self, path: impl AsRef<Path>) -> Result<(), TwinError> {
        let text = std::fs::read_to_string(path)?;
        self.merge_json(&text)
    }

    pub fn insert(&mut self, resource_type: ResourceType, source: Value) -> Result<(), TwinError> {
        let compiled = CompiledSchema::compile(resource_type, source)?;
        self.schemas.insert(resource_type, Arc::new(compiled));
        Ok(())
    }

    pub fn schema_for(&self, resource_type: ResourceType) -> Option<Arc<CompiledSchema>> {
        self.schemas.get(&resource_type).cloned()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.schemas.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
