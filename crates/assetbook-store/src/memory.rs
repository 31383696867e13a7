use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use assetbook_types::Timestamp;
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::change::{ChangeRecord, HistoryStep};
use crate::error::{StoreError, StoreResult};
use crate::snapshot::WorldStateSnapshot;
use crate::traits::{HistoryIterator, WorldState};

/// In-memory world state with a per-key append-only change log.
///
/// Intended for tests, local hosting, and embedding. Every `put` is treated
/// as one committed transaction and stamped with a UUID v7 transaction id and
/// the current time. Iterators read a copy of the log taken when they are
/// opened, so later writes do not leak into an in-flight history scan.
///
/// The store also carries fault switches so that callers can exercise their
/// error paths: [`set_unavailable`](Self::set_unavailable) fails every call,
/// [`fail_puts`](Self::fail_puts) fails only writes, and
/// [`fail_history_after`](Self::fail_history_after) breaks history streams
/// part-way through.
pub struct InMemoryWorldState {
    inner: RwLock<StateInner>,
    faults: Faults,
    iterators: Arc<IteratorCounters>,
}

#[derive(Default)]
struct StateInner {
    current: BTreeMap<String, Vec<u8>>,
    logs: BTreeMap<String, Vec<ChangeRecord>>,
}

#[derive(Default)]
struct Faults {
    unavailable: AtomicBool,
    puts_fail: AtomicBool,
    history_fail_after: Mutex<Option<usize>>,
}

#[derive(Default)]
struct IteratorCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl InMemoryWorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StateInner::default()),
            faults: Faults::default(),
            iterators: Arc::new(IteratorCounters::default()),
        }
    }

    /// Rebuild a world state from a snapshot of its change logs.
    ///
    /// The current value of each key is the payload of its last change, or
    /// absent if that change was a deletion.
    pub fn from_snapshot(snapshot: WorldStateSnapshot) -> Self {
        let mut inner = StateInner::default();
        for (key, log) in snapshot.logs {
            if let Some(last) = log.last() {
                if !last.is_delete && last.has_payload() {
                    inner.current.insert(key.clone(), last.value.clone());
                }
            }
            inner.logs.insert(key, log);
        }
        Self {
            inner: RwLock::new(inner),
            faults: Faults::default(),
            iterators: Arc::new(IteratorCounters::default()),
        }
    }

    /// Capture every change log.
    pub fn snapshot(&self) -> WorldStateSnapshot {
        let inner = self.inner.read().expect("lock poisoned");
        WorldStateSnapshot {
            logs: inner.logs.clone(),
        }
    }

    /// Number of keys that currently hold a value.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").current.len()
    }

    /// Returns `true` if no key currently holds a value.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").current.is_empty()
    }

    /// Sorted list of keys that currently hold a value.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("lock poisoned")
            .current
            .keys()
            .cloned()
            .collect()
    }

    /// Full change log of `key`, oldest first.
    pub fn change_log(&self, key: &str) -> Vec<ChangeRecord> {
        self.inner
            .read()
            .expect("lock poisoned")
            .logs
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove `key` as a host-level event. Returns `true` if the key existed.
    ///
    /// The deletion is recorded in the change log with an empty payload.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.current.remove(key).is_none() {
            return false;
        }
        let change = ChangeRecord::delete(Uuid::now_v7().to_string(), Timestamp::now());
        inner.logs.entry(key.to_string()).or_default().push(change);
        true
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every subsequent `put` fail with [`StoreError::Unavailable`]
    /// while reads keep working.
    pub fn fail_puts(&self, fail: bool) {
        self.faults.puts_fail.store(fail, Ordering::SeqCst);
    }

    /// Make history iterators opened from now on fail after yielding `steps`
    /// changes. `None` restores normal behaviour.
    pub fn fail_history_after(&self, steps: Option<usize>) {
        *self
            .faults
            .history_fail_after
            .lock()
            .expect("lock poisoned") = steps;
    }

    /// Number of history iterators opened but not yet closed.
    pub fn open_iterators(&self) -> usize {
        let opened = self.iterators.opened.load(Ordering::SeqCst);
        let closed = self.iterators.closed.load(Ordering::SeqCst);
        opened - closed
    }

    fn check_available(&self, op: &str, key: &str) -> StoreResult<()> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op} {key}: store offline")));
        }
        Ok(())
    }
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorldState for InMemoryWorldState {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check_available("get", key)?;
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.current.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.check_available("put", key)?;
        if value.is_empty() {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "empty value".into(),
            });
        }
        if self.faults.puts_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("put {key}: write rejected by host")));
        }

        // Stamped under the lock so log order matches tx id and time order.
        let mut inner = self.inner.write().expect("lock poisoned");
        let change =
            ChangeRecord::write(Uuid::now_v7().to_string(), Timestamp::now(), value.clone());
        debug!(key, tx_id = %change.tx_id, bytes = value.len(), "world state put");
        inner.logs.entry(key.to_string()).or_default().push(change);
        inner.current.insert(key.to_string(), value);
        Ok(())
    }

    async fn history(&self, key: &str) -> StoreResult<Box<dyn HistoryIterator>> {
        self.check_available("history", key)?;
        let pending: VecDeque<ChangeRecord> = self
            .inner
            .read()
            .expect("lock poisoned")
            .logs
            .get(key)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default();
        let fail_after = *self
            .faults
            .history_fail_after
            .lock()
            .expect("lock poisoned");

        self.iterators.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryHistoryIterator {
            key: key.to_string(),
            pending,
            yielded: 0,
            fail_after,
            closed: false,
            counters: Arc::clone(&self.iterators),
        }))
    }
}

impl std::fmt::Debug for InMemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWorldState")
            .field("key_count", &self.len())
            .field("open_iterators", &self.open_iterators())
            .finish()
    }
}

/// Cursor over a copy of one key's change log.
///
/// Reports `done` on the step that carries the last change rather than on a
/// separate empty step.
struct InMemoryHistoryIterator {
    key: String,
    pending: VecDeque<ChangeRecord>,
    yielded: usize,
    fail_after: Option<usize>,
    closed: bool,
    counters: Arc<IteratorCounters>,
}

#[async_trait]
impl HistoryIterator for InMemoryHistoryIterator {
    async fn next(&mut self) -> StoreResult<HistoryStep> {
        if self.closed {
            return Err(StoreError::IteratorClosed(self.key.clone()));
        }
        if self.fail_after == Some(self.yielded) {
            return Err(StoreError::Unavailable(format!(
                "history stream for {} interrupted after {} changes",
                self.key, self.yielded
            )));
        }
        match self.pending.pop_front() {
            Some(change) => {
                self.yielded += 1;
                if self.pending.is_empty() {
                    Ok(HistoryStep::last(change))
                } else {
                    Ok(HistoryStep::item(change))
                }
            }
            None => Ok(HistoryStep::exhausted()),
        }
    }

    async fn close(&mut self) -> StoreResult<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for InMemoryHistoryIterator {
    fn drop(&mut self) {
        if !self.closed {
            warn!(key = %self.key, "history iterator dropped without close");
        }
    }
}
