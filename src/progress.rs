use crate::engine::RunReport;
use crate::model::FileReport;

/// Trait for reporting run progress and per-file results.
///
/// The engine never calls two hooks concurrently, so implementations can
/// write to a shared sink without interleaving. All methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_complete(&self, _total_entries: usize) {}
    fn on_result(&self, _report: &FileReport) {}
    fn on_run_complete(&self, _report: &RunReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
