//! Persistent State Cells and a Recoverable Fetch Lifecycle
//!
//! Three cooperating, framework-free primitives: a [`PersistentCell`]
//! mirrors a value to a durable key-value store under a migratable key; a
//! [`ResourceMachine`] (driven asynchronously by a [`ResourceDriver`])
//! owns the lifecycle of a single keyed fetch with stale-response
//! guarding; a [`FailureBoundary`] intercepts failures and offers an
//! explicit, recoverable reset. [`ResourceController`] wires the last two
//! together.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! // 1. A value that survives restarts
//! let store = Arc::new(FileStore::open("cells.json")?);
//! let mut name = PersistentCell::new(store, "name", String::new())?;
//! name.set("Miri".to_string())?;
//!
//! // 2. A keyed fetch with failure recovery
//! let mut controller = ResourceController::new(PokeApi::new())
//!     .on_reset(|| tracing::info!("cleared"));
//! controller.submit("pikachu");
//! match controller.render() {
//!     RenderOutcome::Content(pokemon) => { /* show it */ }
//!     RenderOutcome::Fallback(error) => { /* show retry UI */ }
//!     RenderOutcome::Pending(id) => { /* placeholder */ }
//!     RenderOutcome::Idle => { /* "submit a name" */ }
//! }
//! ```

#![warn(missing_docs)]

// === Core Types ===
mod cell;
mod codec;
mod context;
mod errors;
mod state;

// === Traits ===
mod traits;

// === Storage ===
#[cfg(feature = "file-store")]
mod file;
mod store;

// === Runtime ===
mod boundary;
mod controller;
mod driver;

// === Observability ===
mod observer;
mod stats;

// === Re-exports ===

// Types
pub use context::{now_millis, ResourceId};

// State
pub use state::{AttemptToken, FetchState, ResourceMachine, SettleResult};

// Persistence
pub use cell::{CellError, DecodePolicy, DefaultValue, PersistentCell};
pub use codec::{FnCodec, JsonCodec, SerializationError, ValueCodec};
#[cfg(feature = "file-store")]
pub use file::FileStore;
pub use store::{InMemoryStore, KeyValueStore, StoreError};

// Errors
pub use errors::RequestError;

// Traits
pub use traits::ResourceFetcher;

// Runtime
pub use boundary::{BoundaryState, FailureBoundary};
pub use controller::{RenderOutcome, ResourceController};
pub use driver::ResourceDriver;

// Observability
pub use observer::{LifecycleObserver, NoOpObserver, TracingObserver};
pub use stats::{LifecycleStats, LifecycleStatsSnapshot};
