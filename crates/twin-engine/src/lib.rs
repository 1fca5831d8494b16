//! Twin Engine: generate, validate, retry
//!
//! Drives an unreliable [`ContentGenerator`](twin_core::ContentGenerator)
//! toward a compliant device document within a bounded retry budget, and
//! runs many such requests concurrently.
//!
//! # Pipeline Flow
//!
//! ```text
//! DeviceRequest → Orchestrator ──► generator ──► extract_document
//!                      ▲                              │
//!                      │                  ComplianceValidator
//!                 next_context            (rules + schema + scorer)
//!                      │                              │
//!                      └───── rejected ◄──────────────┤
//!                                                     ▼
//!                                   Accepted / Exhausted → BatchRunner → Recorder
//! ```

pub mod batch;
pub mod config;
pub mod extract;
pub mod generators;
pub mod operations;
pub mod orchestrator;
pub mod recorder;
pub mod scenario;
pub mod validator;

pub use batch::{BatchReport, BatchRunner, DeviceRequest};
pub use config::EngineConfig;
pub use extract::{balanced_json, extract_document};
pub use generators::{ExampleGenerator, FallbackGenerator};
pub use operations::{apply_operation, apply_operation_at, DeviceOperation};
pub use orchestrator::{select_best, Orchestrator, OrchestratorConfig, Strictness};
pub use recorder::MemoryRecorder;
pub use scenario::{select_profile, Scenario, ScenarioCatalog};
pub use validator::ComplianceValidator;
