//! Progress reporting seam for batch regeneration.

/// Receives incremental progress during a full regeneration run.
pub trait ProgressReporter {
    fn on_progress(&mut self, processed: usize, total: usize);
}

/// Reporter that discards progress.
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

/// Reporter that emits progress through the logging backend.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        log::info!(
            "event=report_generate module=sync status=progress processed={} total={}",
            processed,
            total
        );
    }
}
