//! World-state store interface for assetbook.
//!
//! The ledger host owns the actual store. This crate defines the boundary the
//! contract consumes ([`WorldState`] and [`HistoryIterator`]) and ships an
//! in-memory implementation used by tests and by the local CLI host.
//!
//! # Model
//!
//! - One current value per key, read with `get` and written with `put`.
//! - Every write (and every host-level delete) appends a [`ChangeRecord`] to
//!   the key's history log.
//! - History is consumed through a lazy, forward-only iterator that must be
//!   closed by its owner.
//!
//! # Storage Backends
//!
//! - [`InMemoryWorldState`] -- `BTreeMap`-based store with fault injection
//! - [`WorldStateSnapshot`] -- JSON image of an in-memory store on disk
//!
//! # Design Rules
//!
//! 1. A missing key is `Ok(None)`, never an error.
//! 2. Change logs are append-only and ordered oldest to newest.
//! 3. The store never interprets values; it is a pure key-value store.
//! 4. All failures are propagated, never silently ignored.

pub mod change;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use change::{ChangeRecord, HistoryStep};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryWorldState;
pub use snapshot::WorldStateSnapshot;
pub use traits::{HistoryIterator, WorldState};
