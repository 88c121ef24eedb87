//! Recoverable failure boundary
//!
//! A capability-based boundary object: a plain stateful value exposing
//! `intercept` and `current`, no framework base type. It intercepts a
//! failure raised synchronously while producing output for the wrapped
//! subtree, holds it until an explicit reset, and can be told which
//! external values should auto-trigger that reset when they change.
//!
//! Only failures surfaced through [`FailureBoundary::guard`] (or handed
//! directly to `intercept`) are caught. Failures from asynchronous tasks,
//! event handlers, or anything outside the production path propagate to
//! the ambient environment; that is a documented limitation, not a bug.

/// Boundary state: clear, or holding an intercepted failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryState<E> {
    /// No failure intercepted
    Clear,
    /// A failure was intercepted and the fallback should show
    Failed(E),
}

impl<E> BoundaryState<E> {
    /// True when a failure is held
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Borrow the held failure, if any
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Clear => None,
            Self::Failed(error) => Some(error),
        }
    }
}

/// Failure interceptor with an explicit, idempotent reset.
///
/// `W` is the type of the watched values; they are compared with shallow
/// `PartialEq`, so composite values compare however their `PartialEq`
/// does.
pub struct FailureBoundary<E, W = String> {
    state: BoundaryState<E>,
    watched: Vec<W>,
    on_reset: Option<Box<dyn FnMut() + Send>>,
}

impl<E, W: PartialEq + Clone> FailureBoundary<E, W> {
    /// Create a clear boundary with no watched values
    pub fn new() -> Self {
        Self {
            state: BoundaryState::Clear,
            watched: Vec::new(),
            on_reset: None,
        }
    }

    /// Register a hook invoked on every `Failed -> Clear` transition
    pub fn on_reset(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(hook));
        self
    }

    /// Seed the watched-value snapshot
    pub fn watching(mut self, values: &[W]) -> Self {
        self.watched = values.to_vec();
        self
    }

    /// Intercept a failure raised by the wrapped subtree.
    ///
    /// While already failed, the first error is kept: one interception per
    /// failure window.
    pub fn intercept(&mut self, error: E) {
        if !self.state.is_failed() {
            self.state = BoundaryState::Failed(error);
        }
    }

    /// Current boundary state
    pub fn current(&self) -> &BoundaryState<E> {
        &self.state
    }

    /// Explicit reset: `Failed -> Clear`, invoking the `on_reset` hook.
    ///
    /// Idempotent: when already clear this is a no-op, the hook does not
    /// fire, and `false` is returned.
    pub fn reset(&mut self) -> bool {
        if !self.state.is_failed() {
            return false;
        }
        self.state = BoundaryState::Clear;
        if let Some(hook) = self.on_reset.as_mut() {
            hook();
        }
        true
    }

    /// Compare `values` against the watched snapshot; on change, update
    /// the snapshot and, if currently failed, reset.
    ///
    /// Returns whether a reset was triggered.
    pub fn sync_watched(&mut self, values: &[W]) -> bool {
        if self.watched == values {
            return false;
        }
        self.watched = values.to_vec();
        self.reset()
    }

    /// Produce a value, intercepting a synchronous failure.
    ///
    /// While failed the producer is not run (the fallback should render
    /// instead). A producer error transitions to `Failed` and yields
    /// `None`.
    pub fn guard<R>(&mut self, produce: impl FnOnce() -> Result<R, E>) -> Option<R> {
        if self.state.is_failed() {
            return None;
        }
        match produce() {
            Ok(value) => Some(value),
            Err(error) => {
                self.intercept(error);
                None
            }
        }
    }
}

impl<E, W: PartialEq + Clone> Default for FailureBoundary<E, W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Boundary = FailureBoundary<&'static str, String>;

    #[test]
    fn starts_clear() {
        let boundary = Boundary::new();
        assert_eq!(boundary.current(), &BoundaryState::Clear);
    }

    #[test]
    fn intercept_then_reset() {
        let mut boundary = Boundary::new();
        boundary.intercept("boom");
        assert_eq!(boundary.current(), &BoundaryState::Failed("boom"));

        assert!(boundary.reset());
        assert_eq!(boundary.current(), &BoundaryState::Clear);
    }

    #[test]
    fn reset_when_clear_is_noop() {
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = resets.clone();
        let mut boundary = Boundary::new().on_reset(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!boundary.reset());
        assert_eq!(resets.load(Ordering::SeqCst), 0);

        boundary.intercept("boom");
        assert!(boundary.reset());
        assert!(!boundary.reset());
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_error_wins_within_failure_window() {
        let mut boundary = Boundary::new();
        boundary.intercept("first");
        boundary.intercept("second");
        assert_eq!(boundary.current().error(), Some(&"first"));
    }

    #[test]
    fn watched_value_change_resets_when_failed() {
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = resets.clone();
        let mut boundary = Boundary::new()
            .watching(&["bad-name".to_string()])
            .on_reset(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        boundary.intercept("not found");
        assert!(boundary.sync_watched(&["good-name".to_string()]));
        assert_eq!(boundary.current(), &BoundaryState::Clear);
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn watched_value_change_while_clear_only_updates_snapshot() {
        let mut boundary = Boundary::new().watching(&["a".to_string()]);
        assert!(!boundary.sync_watched(&["b".to_string()]));
        assert_eq!(boundary.current(), &BoundaryState::Clear);
    }

    #[test]
    fn unchanged_watched_values_do_nothing() {
        let mut boundary = Boundary::new().watching(&["a".to_string()]);
        boundary.intercept("boom");
        assert!(!boundary.sync_watched(&["a".to_string()]));
        assert!(boundary.current().is_failed());
    }

    #[test]
    fn guard_passes_through_success() {
        let mut boundary = Boundary::new();
        assert_eq!(boundary.guard(|| Ok(42)), Some(42));
        assert_eq!(boundary.current(), &BoundaryState::Clear);
    }

    #[test]
    fn guard_intercepts_synchronous_failure() {
        let mut boundary = Boundary::new();
        let out: Option<u32> = boundary.guard(|| Err("boom"));
        assert_eq!(out, None);
        assert_eq!(boundary.current(), &BoundaryState::Failed("boom"));
    }

    #[test]
    fn guard_skips_producer_while_failed() {
        let mut boundary = Boundary::new();
        boundary.intercept("boom");

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let out: Option<u32> = boundary.guard(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        });
        assert_eq!(out, None);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
