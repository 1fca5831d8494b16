//! Shared test doubles for twin-engine integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use twin_core::{ContentGenerator, GenerationContext, GenerationError, RawContent, ResourceType};
use twin_engine::ComplianceValidator;
use twin_quality::ScoringProfile;
use twin_rules::{FieldType, RuleCatalog, RuleSet};
use twin_schema::SchemaRegistry;

/// One scripted generator response
pub enum Step {
    Doc(Value),
    Text(&'static str),
    Fail(GenerationError),
    Hang(Duration),
}

/// Replays a fixed script, one step per call; fails once the script runs out
pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<GenerationContext>>,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contexts(&self) -> Vec<GenerationContext> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _resource_type: ResourceType,
        ctx: &GenerationContext,
    ) -> Result<RawContent, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(ctx.clone());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Doc(doc)) => Ok(RawContent::Document(doc)),
            Some(Step::Text(text)) => Ok(RawContent::Text(text.to_string())),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Err(GenerationError::Transport("woke up too late".to_string()))
            }
            None => Err(GenerationError::Transport("script exhausted".to_string())),
        }
    }
}

/// Drive rules: Id and Name required, CapacityBytes typed; permissive schema
pub fn id_name_validator(profile: ScoringProfile) -> Arc<ComplianceValidator> {
    let mut rules = RuleCatalog::new();
    rules
        .insert(
            RuleSet::new(ResourceType::Drive)
                .require("Id")
                .require("Name")
                .field_type("CapacityBytes", FieldType::Integer),
        )
        .unwrap();

    let mut schemas = SchemaRegistry::new();
    schemas.insert(ResourceType::Drive, json!({ "type": "object" })).unwrap();

    Arc::new(ComplianceValidator::new(rules, schemas, profile))
}

pub fn compliant_drive() -> Value {
    json!({ "Id": "1", "Name": "Drive 1", "CapacityBytes": 1024 })
}
