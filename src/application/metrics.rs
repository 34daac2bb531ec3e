//! Observability metrics for error reporting.
//!
//! Provides counters describing what the appender did with each event, for
//! monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking reporting statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Events that passed the level filter and the dedup cache
    events_accepted: AtomicU64,
    /// Events below the reporting level
    events_filtered: AtomicU64,
    /// Events dropped because their fingerprint was recently reported
    duplicates_suppressed: AtomicU64,
    /// Fingerprints evicted from the dedup cache
    fingerprints_evicted: AtomicU64,
    /// Reports answered with a 2xx status
    reports_delivered: AtomicU64,
    /// Reports answered with any other status
    reports_rejected: AtomicU64,
    /// Reports that failed before a response was received
    reports_failed: AtomicU64,
    /// Reports cancelled by the report callback
    reports_vetoed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.inner.events_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_filtered(&self) {
        self.inner.events_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.inner
            .duplicates_suppressed
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.inner
            .fingerprints_evicted
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.inner.reports_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.inner.reports_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_vetoed(&self) {
        self.inner.reports_vetoed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of accepted events.
    pub fn events_accepted(&self) -> u64 {
        self.inner.events_accepted.load(Ordering::Relaxed)
    }

    /// Get the number of events below the reporting level.
    pub fn events_filtered(&self) -> u64 {
        self.inner.events_filtered.load(Ordering::Relaxed)
    }

    /// Get the number of suppressed duplicates.
    pub fn duplicates_suppressed(&self) -> u64 {
        self.inner.duplicates_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of evicted fingerprints.
    pub fn fingerprints_evicted(&self) -> u64 {
        self.inner.fingerprints_evicted.load(Ordering::Relaxed)
    }

    /// Get the number of delivered reports.
    pub fn reports_delivered(&self) -> u64 {
        self.inner.reports_delivered.load(Ordering::Relaxed)
    }

    /// Get the number of rejected reports.
    pub fn reports_rejected(&self) -> u64 {
        self.inner.reports_rejected.load(Ordering::Relaxed)
    }

    /// Get the number of failed reports.
    pub fn reports_failed(&self) -> u64 {
        self.inner.reports_failed.load(Ordering::Relaxed)
    }

    /// Get the number of vetoed reports.
    pub fn reports_vetoed(&self) -> u64 {
        self.inner.reports_vetoed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_accepted: self.events_accepted(),
            events_filtered: self.events_filtered(),
            duplicates_suppressed: self.duplicates_suppressed(),
            fingerprints_evicted: self.fingerprints_evicted(),
            reports_delivered: self.reports_delivered(),
            reports_rejected: self.reports_rejected(),
            reports_failed: self.reports_failed(),
            reports_vetoed: self.reports_vetoed(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub events_accepted: u64,
    pub events_filtered: u64,
    pub duplicates_suppressed: u64,
    pub fingerprints_evicted: u64,
    pub reports_delivered: u64,
    pub reports_rejected: u64,
    pub reports_failed: u64,
    pub reports_vetoed: u64,
}

impl MetricsSnapshot {
    /// Ratio of suppressed duplicates to events that passed the level filter
    /// (0.0 to 1.0). Returns 0.0 if no such event has been seen.
    pub fn duplicate_rate(&self) -> f64 {
        let total = self
            .events_accepted
            .saturating_add(self.duplicates_suppressed);
        if total == 0 {
            0.0
        } else {
            self.duplicates_suppressed as f64 / total as f64
        }
    }

    /// Number of reports that reached a final outcome.
    pub fn reports_completed(&self) -> u64 {
        self.reports_delivered
            .saturating_add(self.reports_rejected)
            .saturating_add(self.reports_failed)
            .saturating_add(self.reports_vetoed)
    }
}
