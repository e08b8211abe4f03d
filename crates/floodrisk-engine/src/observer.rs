//! Pass progress hooks.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::aggregator::RiskSummary;

/// Receives progress notifications from a running pass.
///
/// Row notifications may arrive from several worker threads and out of
/// order when the pass is sharded; `done` is the number of rows completed
/// so far across all workers.
pub trait PassObserver: Send + Sync {
    /// Called once before any cell is visited.
    fn on_start(&self, _rows: usize, _cols: usize) {}

    /// Called after each completed row.
    fn on_row(&self, _done: usize) {}

    /// Called once after a successful pass.
    fn on_finish(&self, _summary: &RiskSummary) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PassObserver for NoopObserver {}

/// Shared row counter handed to workers.
#[derive(Debug, Default)]
pub(crate) struct RowProgress {
    done: AtomicUsize,
}

impl RowProgress {
    pub(crate) fn row_done(&self, observer: &dyn PassObserver) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        observer.on_row(done);
    }
}
