//! Lifecycle statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-controller statistics
pub struct LifecycleStats {
    pub submits: AtomicU64,
    pub empty_submits: AtomicU64,
    pub fetches_resolved: AtomicU64,
    pub fetches_rejected: AtomicU64,
    pub stale_dropped: AtomicU64,
    pub boundary_trips: AtomicU64,
    pub boundary_resets: AtomicU64,
}

impl LifecycleStats {
    pub fn new() -> Self {
        Self {
            submits: AtomicU64::new(0),
            empty_submits: AtomicU64::new(0),
            fetches_resolved: AtomicU64::new(0),
            fetches_rejected: AtomicU64::new(0),
            stale_dropped: AtomicU64::new(0),
            boundary_trips: AtomicU64::new(0),
            boundary_resets: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> LifecycleStatsSnapshot {
        LifecycleStatsSnapshot {
            submits: self.submits.load(Ordering::Relaxed),
            empty_submits: self.empty_submits.load(Ordering::Relaxed),
            fetches_resolved: self.fetches_resolved.load(Ordering::Relaxed),
            fetches_rejected: self.fetches_rejected.load(Ordering::Relaxed),
            stale_dropped: self.stale_dropped.load(Ordering::Relaxed),
            boundary_trips: self.boundary_trips.load(Ordering::Relaxed),
            boundary_resets: self.boundary_resets.load(Ordering::Relaxed),
        }
    }
}

impl Default for LifecycleStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct LifecycleStatsSnapshot {
    pub submits: u64,
    pub empty_submits: u64,
    pub fetches_resolved: u64,
    pub fetches_rejected: u64,
    pub stale_dropped: u64,
    pub boundary_trips: u64,
    pub boundary_resets: u64,
}
