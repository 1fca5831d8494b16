//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwinError {
    #[error("TYPE/unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("RULES/{0}")]
    RuleCatalog(String),

    #[error("SCHEMA/{0}")]
    Schema(String),

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("SCENARIO/unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("OPERATION/{0}")]
    Operation(String),

    #[error("RECORD/{0}")]
    Record(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),

    #[error("SERIALIZE/{0}")]
    Serialize(#[from] serde_json::Error),
}
