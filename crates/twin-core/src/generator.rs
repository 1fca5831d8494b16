//! Content Generator: the one external, slow, unreliable dependency
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::context::GenerationContext;
use crate::data_model::ResourceType;

/// What a generator hands back. Text still has to be parsed into a document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    Text(String),
    Document(Value),
}

/// Source of candidate documents (a generative model, a fixture, a fallback)
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short identifier for logs (ex: "azure-openai", "examples")
    fn id(&self) -> &str;

    async fn generate(
        &self,
        resource_type: ResourceType,
        ctx: &GenerationContext,
    ) -> Result<RawContent, GenerationError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("GEN/TRANSPORT: {0}")]
    Transport(String),

    #[error("GEN/AUTH: {0}")]
    Auth(String),

    /// Output could not be turned into a document
    #[error("GEN/PARSE: {0}")]
    Parse(String),

    #[error("GEN/TIMEOUT: no response after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The generator has nothing to offer for this resource type
    #[error("GEN/UNAVAILABLE: {0}")]
    Unavailable(String),
}
