// Metrics hooks for the `jm_match` crate.
//
// Callers install a global `MatchMetrics` implementation via
// [`set_match_metrics`], then `HybridRanker` reports corpus fits and
// per-request latency plus hit counts. This keeps instrumentation decoupled
// from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for ranking operations.
pub trait MatchMetrics: Send + Sync {
    /// Record a completed corpus fit.
    ///
    /// `corpus_len` is the number of postings indexed, `vocab_len` the size
    /// of the fitted TF-IDF vocabulary, and `latency` the wall-clock fit
    /// duration.
    fn record_fit(&self, corpus_len: usize, vocab_len: usize, latency: Duration);

    /// Record the outcome of a match request.
    ///
    /// `latency` is the wall-clock duration between the start and end of the
    /// request, and `hit_count` is the number of results returned to the
    /// caller after truncation.
    fn record_match(&self, latency: Duration, hit_count: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// Typically called once during service startup so all `HybridRanker`
/// instances share the same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
