//! Bounded cache of recently reported fingerprints.
//!
//! The cache remembers the last `capacity` fingerprints that were accepted for
//! reporting. A fingerprint already in the cache is a duplicate. When the cache
//! is full, the oldest inserted fingerprint is evicted before the new one is
//! added.
//!
//! Insertion order is kept in a `VecDeque` and membership in a hash set. Both
//! live behind one mutex, so "check, evict, insert" is a single atomic step
//! and two threads can never both accept the same fingerprint.

use crate::application::metrics::Metrics;
use crate::domain::fingerprint::Fingerprint;
use ahash::AHashSet;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of fingerprints remembered.
pub const DEFAULT_DEDUP_CAPACITY: usize = 200;

/// Outcome of offering a fingerprint to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupDecision {
    /// First sighting; the fingerprint is now cached.
    Accepted {
        /// Fingerprint evicted to make room, if the cache was full
        evicted: Option<Fingerprint>,
    },
    /// The fingerprint is already cached.
    Duplicate,
}

impl DedupDecision {
    /// Check if the event should be reported.
    pub fn is_accepted(&self) -> bool {
        matches!(self, DedupDecision::Accepted { .. })
    }
}

#[derive(Debug, Default)]
struct DedupState {
    order: VecDeque<Fingerprint>,
    members: AHashSet<Fingerprint>,
}

/// Thread-safe FIFO set of recently reported fingerprints.
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    state: Mutex<DedupState>,
    metrics: Metrics,
}

impl DedupCache {
    /// Create a cache holding at most `capacity` fingerprints.
    ///
    /// A capacity of zero is raised to one; the layer builder rejects zero
    /// before it gets here.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(DedupState {
                order: VecDeque::with_capacity(capacity),
                members: AHashSet::with_capacity(capacity),
            }),
            metrics: Metrics::new(),
        }
    }

    /// Attach metrics to record evictions.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    fn lock(&self) -> MutexGuard<'_, DedupState> {
        // The state is always consistent between statements, so a panic in
        // another thread cannot leave it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check the fingerprint and record it if it is new.
    pub fn check_and_insert(&self, fingerprint: Fingerprint) -> DedupDecision {
        let mut state = self.lock();

        if state.members.contains(&fingerprint) {
            return DedupDecision::Duplicate;
        }

        let mut evicted = None;
        if state.order.len() >= self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.members.remove(&oldest);
                self.metrics.record_eviction();
                evicted = Some(oldest);
            }
        }

        state.order.push_back(fingerprint.clone());
        state.members.insert(fingerprint);

        DedupDecision::Accepted { evicted }
    }

    /// Check whether a fingerprint is cached, without modifying the cache.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.lock().members.contains(fingerprint)
    }

    /// Maximum number of fingerprints.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of fingerprints.
    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    /// Forget every fingerprint.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.order.clear();
        state.members.clear();
    }

    /// Cached fingerprints, oldest first.
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.lock().order.iter().cloned().collect()
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}
