//! Batch runner
//!
//! Independent device requests run concurrently, bounded by a semaphore.
//! Every finished report goes through one channel to a single aggregator,
//! which owns the statistics and feeds the recorder. A batch of N requests
//! always yields N reports, in request order, even if a task panics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{AbortHandle, JoinSet};
use twin_core::{
    GenerationContext, GenerationOutcome, GenerationReport, Recorder, ResourceType,
    ValidationResult, TWIN_VERSION,
};
use twin_quality::BatchStatistics;

use crate::orchestrator::Orchestrator;

/// Aborts the wrapped task when dropped, so a cancelled batch stops its
/// in-flight generator calls too
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One logical device to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub resource_type: ResourceType,
    pub instance_id: u32,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub hints: BTreeMap<String, Value>,
}

impl DeviceRequest {
    pub fn new(resource_type: ResourceType, instance_id: u32) -> Self {
        Self {
            resource_type,
            instance_id,
            profile: None,
            hints: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }

    /// Fresh first-round context for this request
    pub fn context(&self) -> GenerationContext {
        let mut ctx = GenerationContext::new(self.instance_id);
        ctx.profile = self.profile.clone();
        ctx.hints = self.hints.clone();
        ctx
    }

    /// Report for a request whose task died before reporting
    fn aborted(&self, reason: impl std::fmt::Display) -> GenerationReport {
        GenerationReport {
            resource_type: self.resource_type,
            instance_id: self.instance_id,
            profile: self.profile.clone(),
            attempts: Vec::new(),
            outcome: GenerationOutcome::Exhausted {
                best_attempt: None,
                artifact: None,
                result: ValidationResult::generation_failure(reason),
            },
        }
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub engine_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub statistics: BatchStatistics,
    pub reports: Vec<GenerationReport>,
}

impl BatchReport {
    /// Whether the average final score reached the scenario target
    pub fn target_met(&self) -> Option<bool> {
        self.target_score
            .map(|target| self.statistics.total > 0 && self.statistics.average_score >= target)
    }
}

pub struct BatchRunner {
    orchestrator: Arc<Orchestrator>,
    concurrency: usize,
    recorder: Option<Arc<dyn Recorder>>,
}

impl BatchRunner {
    pub fn new(orchestrator: Arc<Orchestrator>, concurrency: usize) -> Self {
        Self {
            orchestrator,
            concurrency: concurrency.max(1),
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub async fn run(&self, requests: Vec<DeviceRequest>) -> BatchReport {
        self.run_labelled(None, None, requests).await
    }

    /// Run a batch tagged with a scenario key and its target score
    pub async fn run_labelled(
        &self,
        scenario: Option<String>,
        target_score: Option<f64>,
        requests: Vec<DeviceRequest>,
    ) -> BatchReport {
        let batch_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        let total = requests.len();

        tracing::info!(
            batch_id = %batch_id,
            requests = total,
            concurrency = self.concurrency,
            scenario = scenario.as_deref().unwrap_or("-"),
            "batch started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel::<(usize, GenerationReport)>(total.max(1));
        let mut tasks = JoinSet::new();

        for (index, request) in requests.iter().cloned().enumerate() {
            let orchestrator = Arc::clone(&self.orchestrator);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();

                let resource_type = request.resource_type;
                let ctx = request.context();
                let worker = tokio::spawn(async move { orchestrator.generate(resource_type, ctx).await });
                let _worker_guard = AbortOnDrop(worker.abort_handle());

                let report = match worker.await {
                    Ok(report) => report,
                    Err(err) => {
                        tracing::error!(
                            resource_type = %request.resource_type,
                            instance_id = request.instance_id,
                            error = %err,
                            "generation task aborted"
                        );
                        request.aborted(format!("generation task aborted: {}", err))
                    }
                };

                if tx.send((index, report)).await.is_err() {
                    tracing::warn!(index, "batch aggregator closed before report arrived");
                }
            });
        }
        drop(tx);

        // Single writer: statistics, recorder and slots are only touched here.
        let mut statistics = BatchStatistics::new();
        let mut slots: Vec<Option<GenerationReport>> = (0..total).map(|_| None).collect();
        while let Some((index, report)) = rx.recv().await {
            self.aggregate(&mut statistics, &report);
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(report);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                tracing::error!(batch_id = %batch_id, error = %err, "batch task failed");
            }
        }

        let mut reports = Vec::with_capacity(total);
        for (slot, request) in slots.into_iter().zip(&requests) {
            let report = match slot {
                Some(report) => report,
                None => {
                    let report = request.aborted("generation task did not report");
                    self.aggregate(&mut statistics, &report);
                    report
                }
            };
            reports.push(report);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            batch_id = %batch_id,
            total = statistics.total,
            accepted = statistics.accepted,
            exhausted = statistics.exhausted,
            average_score = statistics.average_score,
            duration_ms,
            "batch finished"
        );

        BatchReport {
            batch_id,
            engine_version: TWIN_VERSION.to_string(),
            scenario,
            target_score,
            started_at,
            duration_ms,
            statistics,
            reports,
        }
    }

    fn aggregate(&self, statistics: &mut BatchStatistics, report: &GenerationReport) {
        statistics.record(report);
        if let Some(recorder) = &self.recorder {
            if let Err(err) = recorder.record(report) {
                tracing::warn!(
                    resource_type = %report.resource_type,
                    instance_id = report.instance_id,
                    error = %err,
                    "recorder rejected report"
                );
            }
        }
    }
}
