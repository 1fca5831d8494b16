//! Built-in content generators
//!
//! `ExampleGenerator` works offline from reference documents;
//! `FallbackGenerator` chains a primary generator onto a secondary one.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use twin_core::{
    ContentGenerator, GenerationContext, GenerationError, RawContent, ResourceType, TwinError,
};

static REFERENCE_EXAMPLES: &str = include_str!("../catalog/examples.json");

/// Emits the reference example for each resource type, stamped with the
/// instance identity and any caller hints.
#[derive(Debug, Clone, Default)]
pub struct ExampleGenerator {
    examples: BTreeMap<ResourceType, Value>,
}

impl ExampleGenerator {
    pub fn new(examples: BTreeMap<ResourceType, Value>) -> Self {
        Self { examples }
    }

    /// Built-in Redfish/Swordfish reference documents
    pub fn redfish() -> Result<Self, TwinError> {
        Self::from_json(REFERENCE_EXAMPLES)
    }

    pub fn from_json(json: &str) -> Result<Self, TwinError> {
        let examples: BTreeMap<ResourceType, Value> = serde_json::from_str(json)?;
        Ok(Self::new(examples))
    }

    fn instantiate(&self, resource_type: ResourceType, ctx: &GenerationContext) -> Option<Value> {
        let mut document = self.examples.get(&resource_type)?.clone();
        let fields = document.as_object_mut()?;

        let id = ctx.instance_id.to_string();
        let odata_id = fields.get("@odata.id").and_then(Value::as_str).map(|current| {
            let collection = current.rsplit_once('/').map_or(current, |(head, _)| head);
            format!("{}/{}", collection, id)
        });
        if let Some(odata_id) = odata_id {
            fields.insert("@odata.id".to_string(), Value::String(odata_id));
        }
        fields.insert("Id".to_string(), Value::String(id));
        fields.insert(
            "Name".to_string(),
            Value::String(format!("{} {}", resource_type, ctx.instance_id)),
        );
        for (key, value) in &ctx.hints {
            fields.insert(key.clone(), value.clone());
        }

        Some(document)
    }
}

#[async_trait]
impl ContentGenerator for ExampleGenerator {
    fn id(&self) -> &str {
        "examples"
    }

    async fn generate(
        &self,
        resource_type: ResourceType,
        ctx: &GenerationContext,
    ) -> Result<RawContent, GenerationError> {
        self.instantiate(resource_type, ctx)
            .map(RawContent::Document)
            .ok_or_else(|| {
                GenerationError::Unavailable(format!("no reference example for {}", resource_type))
            })
    }
}

/// Tries `primary`; on any generation error, asks `secondary` instead
pub struct FallbackGenerator {
    id: String,
    primary: Arc<dyn ContentGenerator>,
    secondary: Arc<dyn ContentGenerator>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn ContentGenerator>, secondary: Arc<dyn ContentGenerator>) -> Self {
        let id = format!("{}|{}", primary.id(), secondary.id());
        Self {
            id,
            primary,
            secondary,
        }
    }
}

#[async_trait]
impl ContentGenerator for FallbackGenerator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(
        &self,
        resource_type: ResourceType,
        ctx: &GenerationContext,
    ) -> Result<RawContent, GenerationError> {
        match self.primary.generate(resource_type, ctx).await {
            Ok(raw) => Ok(raw),
            Err(err) => {
                tracing::warn!(
                    trace_id = %ctx.trace_id,
                    resource_type = %resource_type,
                    primary = self.primary.id(),
                    secondary = self.secondary.id(),
                    error = %err,
                    "primary generator failed, falling back"
                );
                self.secondary.generate(resource_type, ctx).await
            }
        }
    }
}
