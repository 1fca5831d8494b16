//! Recorder: downstream sink for terminal generation reports
use crate::data_model::GenerationReport;
use crate::error::TwinError;

/// Consumes every terminal report, accepted or exhausted. Persistence format
/// is the implementor's business.
pub trait Recorder: Send + Sync {
    fn record(&self, report: &GenerationReport) -> Result<(), TwinError>;
}
