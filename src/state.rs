//! Fetch lifecycle state machine
//!
//! `ResourceMachine` owns the state of a single outstanding fetch keyed by
//! an externally supplied identifier. Every submit of a non-empty
//! identifier starts a fresh attempt and synchronously moves to `Pending`;
//! completions settle through an [`AttemptToken`] so that a response for a
//! superseded identifier is dropped instead of overwriting newer state.

use crate::context::{now_millis, ResourceId};

/// Lifecycle of a fetch; exactly one tag is active at any time
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchState<P, E> {
    /// No identifier supplied yet
    Idle,
    /// Request in flight for `id`
    Pending {
        /// Identifier the in-flight request was issued for
        id: ResourceId,
    },
    /// Last completed request succeeded
    Resolved {
        /// Identifier current when the request was issued
        id: ResourceId,
        /// Payload the request resolved with
        payload: P,
    },
    /// Last completed request failed
    Rejected {
        /// Identifier current when the request was issued
        id: ResourceId,
        /// Error the request failed with, captured verbatim
        error: E,
    },
}

impl<P, E> FetchState<P, E> {
    /// Identifier recorded in the active tag, if any
    pub fn id(&self) -> Option<&ResourceId> {
        match self {
            Self::Idle => None,
            Self::Pending { id } => Some(id),
            Self::Resolved { id, .. } => Some(id),
            Self::Rejected { id, .. } => Some(id),
        }
    }

    /// True in the `Idle` tag
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True while a request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// True after a successful completion
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// True after a failed completion
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Token for one fetch attempt.
///
/// Issued by [`ResourceMachine::submit`]; a completion settles only while
/// its token is still the machine's current attempt.
#[derive(Clone, Debug)]
pub struct AttemptToken {
    id: ResourceId,
    seq: u64,
    issued_at_millis: u64,
}

impl AttemptToken {
    /// Identifier this attempt was issued for
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// When the attempt was issued (millis since UNIX epoch)
    pub fn issued_at_millis(&self) -> u64 {
        self.issued_at_millis
    }
}

/// Outcome of settling an attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleResult {
    /// The completion was applied to the state
    Settled,
    /// The attempt was superseded; the completion was dropped
    Stale,
}

impl SettleResult {
    /// True when the completion was dropped as stale
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// State machine for a single keyed fetch
pub struct ResourceMachine<P, E> {
    state: FetchState<P, E>,
    seq: u64,
}

impl<P, E> ResourceMachine<P, E> {
    /// Create a machine in `Idle`
    pub fn new() -> Self {
        Self {
            state: FetchState::Idle,
            seq: 0,
        }
    }

    /// Submit an identifier.
    ///
    /// An empty identifier issues no request: the state returns to `Idle`
    /// and in-flight attempts become stale. A non-empty identifier starts
    /// a new attempt, synchronously moving to `Pending` before any
    /// asynchronous work runs, and supersedes the previous attempt
    /// whatever its state.
    pub fn submit(&mut self, id: impl Into<ResourceId>) -> Option<AttemptToken> {
        let id = id.into();
        self.seq += 1;
        if id.is_empty() {
            self.state = FetchState::Idle;
            return None;
        }
        self.state = FetchState::Pending { id: id.clone() };
        Some(AttemptToken {
            id,
            seq: self.seq,
            issued_at_millis: now_millis(),
        })
    }

    /// Settle an attempt with its completion.
    ///
    /// Applies `Resolved`/`Rejected` only when the token is still the
    /// current attempt; a stale completion leaves the state untouched.
    pub fn settle(&mut self, token: &AttemptToken, outcome: Result<P, E>) -> SettleResult {
        if token.seq != self.seq {
            return SettleResult::Stale;
        }
        self.state = match outcome {
            Ok(payload) => FetchState::Resolved {
                id: token.id.clone(),
                payload,
            },
            Err(error) => FetchState::Rejected {
                id: token.id.clone(),
                error,
            },
        };
        SettleResult::Settled
    }

    /// Return to `Idle`, invalidating any in-flight attempt
    pub fn reset(&mut self) {
        self.seq += 1;
        self.state = FetchState::Idle;
    }

    /// Borrow the current state
    pub fn state(&self) -> &FetchState<P, E> {
        &self.state
    }

    /// Snapshot the current state
    pub fn snapshot(&self) -> FetchState<P, E>
    where
        P: Clone,
        E: Clone,
    {
        self.state.clone()
    }
}

impl<P, E> Default for ResourceMachine<P, E> {
    fn default() -> Self {
        Self::new()
    }
}
