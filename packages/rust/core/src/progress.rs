//! Progress callbacks for the details pipeline.

use crate::details::DetailsSummary;

/// Progress callback for reporting enrichment status.
pub trait ProgressReporter: Send + Sync {
    /// Called once the pending record set is known.
    fn start(&self, total: usize);
    /// Called after each course, whatever its outcome.
    fn course_done(&self, offer_rk: i64, ok: bool);
    /// Called when the pass over the record set completes.
    fn finish(&self, summary: &DetailsSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _total: usize) {}
    fn course_done(&self, _offer_rk: i64, _ok: bool) {}
    fn finish(&self, _summary: &DetailsSummary) {}
}
