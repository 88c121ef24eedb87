//! Lifecycle observer trait

use crate::ResourceId;

/// Observer trait for external observability
pub trait LifecycleObserver: Send + Sync + 'static {
    fn on_fetch_started(&self, id: &ResourceId);
    fn on_fetch_resolved(&self, id: &ResourceId, duration_millis: u64);
    fn on_fetch_rejected(&self, id: &ResourceId, error: &str, duration_millis: u64);
    fn on_stale_dropped(&self, id: &ResourceId);
    fn on_boundary_tripped(&self, error: &str);
    fn on_boundary_reset(&self);
}

/// No-op observer
pub struct NoOpObserver;

impl LifecycleObserver for NoOpObserver {
    fn on_fetch_started(&self, _id: &ResourceId) {}
    fn on_fetch_resolved(&self, _id: &ResourceId, _duration_millis: u64) {}
    fn on_fetch_rejected(&self, _id: &ResourceId, _error: &str, _duration_millis: u64) {}
    fn on_stale_dropped(&self, _id: &ResourceId) {}
    fn on_boundary_tripped(&self, _error: &str) {}
    fn on_boundary_reset(&self) {}
}

/// Tracing-based observer
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_fetch_started(&self, id: &ResourceId) {
        tracing::info!(id = %id, "Fetch started");
    }

    fn on_fetch_resolved(&self, id: &ResourceId, duration_millis: u64) {
        tracing::info!(id = %id, duration_ms = duration_millis, "Fetch resolved");
    }

    fn on_fetch_rejected(&self, id: &ResourceId, error: &str, duration_millis: u64) {
        tracing::warn!(id = %id, error = %error, duration_ms = duration_millis, "Fetch rejected");
    }

    fn on_stale_dropped(&self, id: &ResourceId) {
        tracing::debug!(id = %id, "Stale completion dropped");
    }

    fn on_boundary_tripped(&self, error: &str) {
        tracing::error!(error = %error, "Boundary tripped");
    }

    fn on_boundary_reset(&self) {
        tracing::info!("Boundary reset");
    }
}
