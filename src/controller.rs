//! Controller composing the fetch machine with a failure boundary
//!
//! Implements the full identifier-in, render-data-out flow: each submit
//! of a new identifier starts a fresh attempt and is synced into the
//! boundary's watched values (so changing the identifier while failed
//! auto-resets the boundary); rendering re-raises a `Rejected` error into
//! the boundary, which holds the fallback until an explicit retry or a
//! watched-value change.

use crate::boundary::FailureBoundary;
use crate::context::ResourceId;
use crate::driver::ResourceDriver;
use crate::observer::{LifecycleObserver, NoOpObserver};
use crate::state::FetchState;
use crate::stats::{LifecycleStats, LifecycleStatsSnapshot};
use crate::traits::ResourceFetcher;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Data a render pass hands to presentation collaborators.
///
/// Presentation is a pure function of this value: an "idle" message for
/// `Idle`, a placeholder for `Pending`, the payload view for `Content`,
/// and an error summary with a retry action for `Fallback`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome<P, E> {
    /// No identifier submitted yet
    Idle,
    /// Request in flight for the identifier
    Pending(ResourceId),
    /// Resolved payload
    Content(P),
    /// Intercepted failure; retry via [`ResourceController::retry`]
    Fallback(E),
}

impl<P, E> RenderOutcome<P, E> {
    /// True when the fallback should show
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Composition of driver, boundary and the current identifier
pub struct ResourceController<F: ResourceFetcher> {
    driver: ResourceDriver<F>,
    boundary: FailureBoundary<F::Error, ResourceId>,
    identifier: ResourceId,
    observer: Arc<dyn LifecycleObserver>,
    stats: Arc<LifecycleStats>,
}

impl<F> ResourceController<F>
where
    F: ResourceFetcher,
    F::Payload: Clone,
    F::Error: Clone + std::fmt::Display,
{
    /// Create a controller with no observer
    pub fn new(fetcher: F) -> Self {
        Self::with_observer(fetcher, Arc::new(NoOpObserver))
    }

    /// Create a controller with an observer
    pub fn with_observer(fetcher: F, observer: Arc<dyn LifecycleObserver>) -> Self {
        let stats = Arc::new(LifecycleStats::new());
        Self {
            driver: ResourceDriver::with_parts(fetcher, observer.clone(), stats.clone()),
            boundary: FailureBoundary::new().watching(&[ResourceId::empty()]),
            identifier: ResourceId::empty(),
            observer,
            stats,
        }
    }

    /// Create a controller and submit an initial identifier.
    ///
    /// A non-empty initial identifier starts `Pending` immediately; the
    /// first render never observes an `Idle` flash.
    pub fn with_initial(
        fetcher: F,
        id: impl Into<ResourceId>,
    ) -> (Self, Option<JoinHandle<()>>) {
        let mut controller = Self::new(fetcher);
        let handle = controller.submit(id);
        (controller, handle)
    }

    /// Register a hook invoked whenever the boundary resets
    pub fn on_reset(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.boundary = std::mem::take(&mut self.boundary).on_reset(hook);
        self
    }

    /// Submit an identifier.
    ///
    /// Syncs the identifier into the boundary's watched values first: a
    /// change while the boundary is failed resets it, so the new attempt
    /// renders from a clean boundary.
    pub fn submit(&mut self, id: impl Into<ResourceId>) -> Option<JoinHandle<()>> {
        let id = id.into();
        self.identifier = id.clone();
        if self.boundary.sync_watched(std::slice::from_ref(&id)) {
            self.stats.boundary_resets.fetch_add(1, Ordering::Relaxed);
            self.observer.on_boundary_reset();
        }
        self.driver.submit(id)
    }

    /// Produce the data for one render pass.
    ///
    /// A `Rejected` machine state is re-raised into the boundary here,
    /// intercepted exactly once; after that the boundary holds the
    /// fallback until reset.
    pub fn render(&mut self) -> RenderOutcome<F::Payload, F::Error> {
        if let Some(error) = self.boundary.current().error() {
            return RenderOutcome::Fallback(error.clone());
        }
        match self.driver.state() {
            FetchState::Idle => RenderOutcome::Idle,
            FetchState::Pending { id } => RenderOutcome::Pending(id),
            FetchState::Resolved { payload, .. } => RenderOutcome::Content(payload),
            FetchState::Rejected { error, .. } => {
                self.boundary.intercept(error.clone());
                self.stats.boundary_trips.fetch_add(1, Ordering::Relaxed);
                self.observer.on_boundary_tripped(&error.to_string());
                RenderOutcome::Fallback(error)
            }
        }
    }

    /// Retry after a failure.
    ///
    /// Resets the boundary (invoking the `on_reset` hook), clears the
    /// identifier and returns the machine to `Idle`, ready for a fresh
    /// submit. A retry while the boundary is clear is a no-op.
    pub fn retry(&mut self) {
        if self.boundary.reset() {
            self.stats.boundary_resets.fetch_add(1, Ordering::Relaxed);
            self.observer.on_boundary_reset();
            self.identifier = ResourceId::empty();
            self.driver.reset();
        }
    }

    /// Identifier most recently submitted
    pub fn identifier(&self) -> &ResourceId {
        &self.identifier
    }

    /// Snapshot the fetch state
    pub fn state(&self) -> FetchState<F::Payload, F::Error> {
        self.driver.state()
    }

    /// Snapshot the lifecycle counters
    pub fn stats(&self) -> LifecycleStatsSnapshot {
        self.stats.snapshot()
    }
}
