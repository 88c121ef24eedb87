//! Async glue between the state machine and the request collaborator
//!
//! The driver serializes machine transitions behind a mutex that is never
//! held across an await. Submitting moves the machine to `Pending`
//! synchronously, before the request task is spawned, so observers of the
//! state never see a flash of `Idle` between submit and fetch. There is
//! no true cancellation: a superseded attempt's task runs to completion
//! and its settle is dropped by the token check.

use crate::context::{now_millis, ResourceId};
use crate::observer::{LifecycleObserver, NoOpObserver};
use crate::state::{FetchState, ResourceMachine, SettleResult};
use crate::stats::LifecycleStats;
use crate::traits::ResourceFetcher;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Drives a [`ResourceMachine`] with a [`ResourceFetcher`]
pub struct ResourceDriver<F: ResourceFetcher> {
    machine: Arc<Mutex<ResourceMachine<F::Payload, F::Error>>>,
    fetcher: Arc<F>,
    observer: Arc<dyn LifecycleObserver>,
    stats: Arc<LifecycleStats>,
}

impl<F> ResourceDriver<F>
where
    F: ResourceFetcher,
    F::Error: std::fmt::Display,
{
    /// Create a driver with no observer
    pub fn new(fetcher: F) -> Self {
        Self::with_parts(fetcher, Arc::new(NoOpObserver), Arc::new(LifecycleStats::new()))
    }

    /// Create a driver with explicit observer and stats handles
    pub fn with_parts(
        fetcher: F,
        observer: Arc<dyn LifecycleObserver>,
        stats: Arc<LifecycleStats>,
    ) -> Self {
        Self {
            machine: Arc::new(Mutex::new(ResourceMachine::new())),
            fetcher: Arc::new(fetcher),
            observer,
            stats,
        }
    }

    /// Submit an identifier.
    ///
    /// An empty identifier issues no request and returns the machine to
    /// `Idle`. Otherwise the machine moves to `Pending` synchronously and
    /// the request runs on a spawned task; the returned handle completes
    /// when the attempt has settled (or been dropped as stale).
    pub fn submit(&self, id: impl Into<ResourceId>) -> Option<JoinHandle<()>> {
        let token = match self.machine.lock() {
            Ok(mut machine) => machine.submit(id),
            Err(err) => {
                tracing::error!(error = %err, "Machine lock poisoned; submit dropped");
                return None;
            }
        };
        let Some(token) = token else {
            self.stats.empty_submits.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        self.stats.submits.fetch_add(1, Ordering::Relaxed);
        self.observer.on_fetch_started(token.id());

        let machine = Arc::clone(&self.machine);
        let fetcher = Arc::clone(&self.fetcher);
        let observer = Arc::clone(&self.observer);
        let stats = Arc::clone(&self.stats);

        Some(tokio::spawn(async move {
            let outcome = fetcher.fetch(token.id()).await;
            let duration = now_millis().saturating_sub(token.issued_at_millis());
            let rejection = outcome.as_ref().err().map(|e| e.to_string());

            let settled = match machine.lock() {
                Ok(mut machine) => machine.settle(&token, outcome),
                Err(err) => {
                    tracing::error!(error = %err, "Machine lock poisoned; completion dropped");
                    return;
                }
            };

            match settled {
                SettleResult::Settled => match rejection {
                    None => {
                        stats.fetches_resolved.fetch_add(1, Ordering::Relaxed);
                        observer.on_fetch_resolved(token.id(), duration);
                    }
                    Some(error) => {
                        stats.fetches_rejected.fetch_add(1, Ordering::Relaxed);
                        observer.on_fetch_rejected(token.id(), &error, duration);
                    }
                },
                SettleResult::Stale => {
                    stats.stale_dropped.fetch_add(1, Ordering::Relaxed);
                    observer.on_stale_dropped(token.id());
                }
            }
        }))
    }

    /// Snapshot the current fetch state.
    ///
    /// A poisoned machine reads as `Idle` (and logs an error); the lock is
    /// only ever held for non-panicking transitions.
    pub fn state(&self) -> FetchState<F::Payload, F::Error>
    where
        F::Payload: Clone,
        F::Error: Clone,
    {
        match self.machine.lock() {
            Ok(machine) => machine.snapshot(),
            Err(err) => {
                tracing::error!(error = %err, "Machine lock poisoned; reading as Idle");
                FetchState::Idle
            }
        }
    }

    /// Return the machine to `Idle`, invalidating any in-flight attempt
    pub fn reset(&self) {
        if let Ok(mut machine) = self.machine.lock() {
            machine.reset();
        }
    }

    /// Stats handle shared with this driver
    pub fn stats(&self) -> &Arc<LifecycleStats> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RequestError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    /// Fetcher whose completions are held behind per-identifier gates so
    /// tests control resolution order.
    struct GatedFetcher {
        gates: Mutex<HashMap<String, Arc<Notify>>>,
    }

    impl GatedFetcher {
        fn new() -> Self {
            Self {
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, id: &str) -> Arc<Notify> {
            let mut gates = self.gates.lock().unwrap();
            gates.entry(id.to_owned()).or_default().clone()
        }

        fn open(&self, id: &str) {
            self.gate(id).notify_one();
        }
    }

    #[async_trait]
    impl ResourceFetcher for Arc<GatedFetcher> {
        type Payload = String;
        type Error = RequestError;

        async fn fetch(&self, id: &ResourceId) -> Result<String, RequestError> {
            self.gate(id.as_str()).notified().await;
            if id.as_str().starts_with("bad") {
                Err(RequestError::NotFound(id.clone()))
            } else {
                Ok(format!("{}-data", id))
            }
        }
    }

    /// Fetcher that completes immediately.
    struct InstantFetcher;

    #[async_trait]
    impl ResourceFetcher for InstantFetcher {
        type Payload = String;
        type Error = RequestError;

        async fn fetch(&self, id: &ResourceId) -> Result<String, RequestError> {
            if id.as_str().starts_with("bad") {
                Err(RequestError::NotFound(id.clone()))
            } else {
                Ok(format!("{}-data", id))
            }
        }
    }

    #[tokio::test]
    async fn submit_resolves_through_pending() {
        let driver = ResourceDriver::new(InstantFetcher);

        let handle = driver.submit("pikachu").unwrap();
        assert!(driver.state().is_pending());

        handle.await.unwrap();
        assert_eq!(
            driver.state(),
            FetchState::Resolved {
                id: "pikachu".into(),
                payload: "pikachu-data".into(),
            }
        );
        assert_eq!(driver.stats().snapshot().fetches_resolved, 1);
    }

    #[tokio::test]
    async fn rejection_is_captured_verbatim() {
        let driver = ResourceDriver::new(InstantFetcher);

        driver.submit("bad-name").unwrap().await.unwrap();
        assert_eq!(
            driver.state(),
            FetchState::Rejected {
                id: "bad-name".into(),
                error: RequestError::NotFound("bad-name".into()),
            }
        );
        assert_eq!(driver.stats().snapshot().fetches_rejected, 1);
    }

    #[tokio::test]
    async fn empty_identifier_issues_no_request() {
        let driver = ResourceDriver::new(InstantFetcher);

        assert!(driver.submit("").is_none());
        assert!(driver.state().is_idle());
        assert_eq!(driver.stats().snapshot().empty_submits, 1);
        assert_eq!(driver.stats().snapshot().submits, 0);
    }

    #[tokio::test]
    async fn late_completion_for_superseded_identifier_is_dropped() {
        let fetcher = Arc::new(GatedFetcher::new());
        let driver = ResourceDriver::new(fetcher.clone());

        let handle_a = driver.submit("a").unwrap();
        let handle_b = driver.submit("b").unwrap();

        // b completes first and wins.
        fetcher.open("b");
        handle_b.await.unwrap();
        assert_eq!(
            driver.state(),
            FetchState::Resolved {
                id: "b".into(),
                payload: "b-data".into(),
            }
        );

        // a's late completion must not overwrite b's state.
        fetcher.open("a");
        handle_a.await.unwrap();
        assert_eq!(
            driver.state(),
            FetchState::Resolved {
                id: "b".into(),
                payload: "b-data".into(),
            }
        );
        assert_eq!(driver.stats().snapshot().stale_dropped, 1);
    }

    #[tokio::test]
    async fn late_rejection_for_superseded_identifier_is_dropped() {
        let fetcher = Arc::new(GatedFetcher::new());
        let driver = ResourceDriver::new(fetcher.clone());

        let handle_bad = driver.submit("bad-name").unwrap();
        let handle_b = driver.submit("b").unwrap();

        fetcher.open("b");
        handle_b.await.unwrap();

        fetcher.open("bad-name");
        handle_bad.await.unwrap();

        assert!(driver.state().is_resolved());
        assert_eq!(driver.stats().snapshot().stale_dropped, 1);
        assert_eq!(driver.stats().snapshot().fetches_rejected, 0);
    }

    #[tokio::test]
    async fn reset_drops_in_flight_attempt() {
        let fetcher = Arc::new(GatedFetcher::new());
        let driver = ResourceDriver::new(fetcher.clone());

        let handle = driver.submit("a").unwrap();
        driver.reset();
        assert!(driver.state().is_idle());

        fetcher.open("a");
        handle.await.unwrap();
        assert!(driver.state().is_idle());
        assert_eq!(driver.stats().snapshot().stale_dropped, 1);
    }
}
