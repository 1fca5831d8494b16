//! In-memory recorder
use std::sync::Mutex;
use twin_core::{GenerationReport, Recorder, TwinError};

/// Keeps every report it is handed, in arrival order
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    reports: Mutex<Vec<GenerationReport>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<GenerationReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|reports| reports.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, report: &GenerationReport) -> Result<(), TwinError> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|_| TwinError::Record("memory recorder lock poisoned".to_string()))?;
        reports.push(report.clone());
        Ok(())
    }
}
