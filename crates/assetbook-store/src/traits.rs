use async_trait::async_trait;

use crate::change::HistoryStep;
use crate::error::StoreResult;

/// Versioned key-value world state supplied by the ledger host.
///
/// Every call suspends the caller until the store replies. Implementations
/// must satisfy these invariants:
/// - `get` signals a missing key with `Ok(None)`, never with an error.
/// - Each successful `put` appends one change to the key's history log.
/// - History logs are append-only and ordered oldest to newest.
/// - Failures are propagated, never silently ignored.
#[async_trait]
pub trait WorldState: Send + Sync {
    /// Read the current value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any current value.
    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Open a lazy iterator over the change log of `key`.
    ///
    /// The caller owns the iterator and must [`close`](HistoryIterator::close)
    /// it on every exit path.
    async fn history(&self, key: &str) -> StoreResult<Box<dyn HistoryIterator>>;
}

/// Forward-only, single-use cursor over one key's change log.
///
/// Each call to [`next`](Self::next) yields a [`HistoryStep`]. A step may carry
/// a change and report `done` at the same time, so consumers must inspect
/// `value` before acting on `done`.
#[async_trait]
pub trait HistoryIterator: Send {
    /// Advance the cursor.
    async fn next(&mut self) -> StoreResult<HistoryStep>;

    /// Release the cursor. Calling `close` more than once is a no-op.
    async fn close(&mut self) -> StoreResult<()>;
}
