use assetbook_store::{HistoryIterator, WorldState};
use assetbook_types::{codec, HistoryEntry};
use tracing::debug;

use crate::error::{ContractError, ContractResult};

/// Rebuilds the ordered history of an asset from the store's change log.
pub struct HistoryReconstructor;

impl HistoryReconstructor {
    /// Drain the change log of `msisdn` into point-in-time snapshots.
    ///
    /// Changes with an empty payload (deletions) are skipped. The iterator is
    /// closed on every path; if draining already failed, that error wins over
    /// a failing close.
    pub async fn reconstruct<S: WorldState + ?Sized>(
        store: &S,
        msisdn: &str,
    ) -> ContractResult<Vec<HistoryEntry>> {
        let mut iter = store.history(msisdn).await?;
        let drained = drain(&mut *iter, msisdn).await;
        let closed = iter.close().await;

        match (drained, closed) {
            (Ok(entries), Ok(())) => {
                debug!(msisdn, entries = entries.len(), "history reconstructed");
                Ok(entries)
            }
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                debug!(
                    msisdn,
                    error = %close_err,
                    "history iterator close failed after drain error"
                );
                Err(e)
            }
        }
    }
}

async fn drain<I: HistoryIterator + ?Sized>(
    iter: &mut I,
    msisdn: &str,
) -> ContractResult<Vec<HistoryEntry>> {
    let mut entries = Vec::new();
    loop {
        let step = iter.next().await?;

        // The terminal step may still carry a change, so look at the value
        // before looking at `done`.
        if let Some(change) = step.value {
            if change.has_payload() {
                let value = codec::decode(&change.value).map_err(|source| {
                    ContractError::Decode {
                        msisdn: msisdn.to_string(),
                        source,
                    }
                })?;
                entries.push(HistoryEntry {
                    tx_id: change.tx_id,
                    timestamp: change.timestamp,
                    is_delete: change.is_delete,
                    value,
                });
            }
        }

        if step.done {
            return Ok(entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use assetbook_store::{
        ChangeRecord, HistoryStep, InMemoryWorldState, StoreError, StoreResult,
    };
    use assetbook_types::{AssetRecord, Timestamp};
    use async_trait::async_trait;

    use super::*;
    use crate::engine::AssetContract;

    const MSISDN: &str = "9999999999";

    /// Host iterator that replays a fixed script of steps.
    struct ScriptedIterator {
        steps: VecDeque<StoreResult<HistoryStep>>,
        fail_close: bool,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HistoryIterator for ScriptedIterator {
        async fn next(&mut self) -> StoreResult<HistoryStep> {
            self.steps
                .pop_front()
                .unwrap_or_else(|| Ok(HistoryStep::exhausted()))
        }

        async fn close(&mut self) -> StoreResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(StoreError::Unavailable("close refused".into()));
            }
            Ok(())
        }
    }

    /// World state whose only capability is handing out one scripted iterator.
    struct ScriptedState {
        iterator: Mutex<Option<ScriptedIterator>>,
        closes: Arc<AtomicUsize>,
    }

    impl ScriptedState {
        fn new(steps: Vec<StoreResult<HistoryStep>>) -> Self {
            Self::build(steps, false)
        }

        fn build(steps: Vec<StoreResult<HistoryStep>>, fail_close: bool) -> Self {
            let closes = Arc::new(AtomicUsize::new(0));
            Self {
                iterator: Mutex::new(Some(ScriptedIterator {
                    steps: steps.into(),
                    fail_close,
                    closes: Arc::clone(&closes),
                })),
                closes,
            }
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WorldState for ScriptedState {
        async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Err(StoreError::Unavailable("scripted".into()))
        }

        async fn put(&self, _key: &str, _value: Vec<u8>) -> StoreResult<()> {
            Err(StoreError::Unavailable("scripted".into()))
        }

        async fn history(&self, _key: &str) -> StoreResult<Box<dyn HistoryIterator>> {
            let it = self.iterator.lock().unwrap().take().unwrap();
            Ok(Box::new(it))
        }
    }

    fn change(tx: &str, balance: f64) -> ChangeRecord {
        let record = AssetRecord::new("D1", MSISDN, "1234", balance, "active");
        ChangeRecord::write(tx, Timestamp::new(1_700_000_000, 0), codec::encode(&record).unwrap())
    }

    fn balances(entries: &[HistoryEntry]) -> Vec<f64> {
        entries.iter().map(|e| e.value.balance).collect()
    }

    // -----------------------------------------------------------------------
    // Stream shapes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn separate_terminal_step() {
        let state = ScriptedState::new(vec![
            Ok(HistoryStep::item(change("tx1", 100.0))),
            Ok(HistoryStep::item(change("tx2", 74.5))),
            Ok(HistoryStep::exhausted()),
        ]);
        let entries = HistoryReconstructor::reconstruct(&state, MSISDN).await.unwrap();
        assert_eq!(balances(&entries), vec![100.0, 74.5]);
        assert_eq!(entries[0].tx_id, "tx1");
        assert_eq!(entries[1].tx_id, "tx2");
        assert_eq!(state.closes(), 1);
    }

    #[tokio::test]
    async fn terminal_step_with_payload_is_kept() {
        let state = ScriptedState::new(vec![
            Ok(HistoryStep::item(change("tx1", 1.0))),
            Ok(HistoryStep::last(change("tx2", 2.0))),
            // Never reached.
            Ok(HistoryStep::item(change("tx3", 3.0))),
        ]);
        let entries = HistoryReconstructor::reconstruct(&state, MSISDN).await.unwrap();
        assert_eq!(balances(&entries), vec![1.0, 2.0]);
        assert_eq!(state.closes(), 1);
    }

    #[tokio::test]
    async fn empty_payload_is_skipped() {
        let state = ScriptedState::new(vec![
            Ok(HistoryStep::item(change("tx1", 10.0))),
            Ok(HistoryStep::item(ChangeRecord::delete("tx2", Timestamp::new(5, 0)))),
            Ok(HistoryStep::last(change("tx3", 20.0))),
        ]);
        let entries = HistoryReconstructor::reconstruct(&state, MSISDN).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].tx_id, "tx3");
    }

    #[tokio::test]
    async fn delete_flag_is_carried_when_payload_present() {
        let mut c = change("tx1", 10.0);
        c.is_delete = true;
        let state = ScriptedState::new(vec![Ok(HistoryStep::last(c))]);
        let entries = HistoryReconstructor::reconstruct(&state, MSISDN).await.unwrap();
        assert!(entries[0].is_delete);
    }

    #[tokio::test]
    async fn no_history_is_empty_list() {
        let state = ScriptedState::new(vec![Ok(HistoryStep::exhausted())]);
        let entries = HistoryReconstructor::reconstruct(&state, MSISDN).await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(state.closes(), 1);
    }

    // -----------------------------------------------------------------------
    // Release on every path
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn closed_after_step_failure() {
        let state = ScriptedState::new(vec![
            Ok(HistoryStep::item(change("tx1", 1.0))),
            Err(StoreError::Unavailable("peer gone".into())),
        ]);
        let err = HistoryReconstructor::reconstruct(&state, MSISDN)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::StoreUnavailable(_)));
        assert_eq!(state.closes(), 1);
    }

    #[tokio::test]
    async fn closed_after_decode_failure() {
        let bad = ChangeRecord::write("tx1", Timestamp::zero(), b"garbage".to_vec());
        let state = ScriptedState::new(vec![
            Ok(HistoryStep::item(bad)),
            Ok(HistoryStep::last(change("tx2", 1.0))),
        ]);
        let err = HistoryReconstructor::reconstruct(&state, MSISDN)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Decode { .. }));
        assert_eq!(state.closes(), 1);
    }

    #[tokio::test]
    async fn close_failure_after_clean_drain_is_reported() {
        let state = ScriptedState::build(vec![Ok(HistoryStep::last(change("tx1", 1.0)))], true);
        let err = HistoryReconstructor::reconstruct(&state, MSISDN)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn drain_error_wins_over_close_error() {
        let bad = ChangeRecord::write("tx1", Timestamp::zero(), b"[]".to_vec());
        let state = ScriptedState::build(vec![Ok(HistoryStep::last(bad))], true);
        let err = HistoryReconstructor::reconstruct(&state, MSISDN)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Decode { .. }));
        assert_eq!(state.closes(), 1);
    }

    // -----------------------------------------------------------------------
    // Against the in-memory world state
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_and_two_updates_give_three_entries() {
        let contract = AssetContract::default();
        let store = InMemoryWorldState::new();
        contract
            .create_asset(&store, "D1", MSISDN, "1234", "100", "active")
            .await
            .unwrap();
        contract
            .update_balance(&store, MSISDN, "40", "debit", "a")
            .await
            .unwrap();
        contract
            .update_balance(&store, MSISDN, "15", "credit", "b")
            .await
            .unwrap();

        let entries = HistoryReconstructor::reconstruct(&store, MSISDN).await.unwrap();
        assert_eq!(balances(&entries), vec![100.0, 60.0, 75.0]);
        assert!(entries.iter().all(|e| !e.is_delete));
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(store.open_iterators(), 0);
    }

    #[tokio::test]
    async fn host_deletion_is_not_listed() {
        let contract = AssetContract::default();
        let store = InMemoryWorldState::new();
        contract
            .create_asset(&store, "D1", MSISDN, "1234", "5", "active")
            .await
            .unwrap();
        store.delete(MSISDN);
        contract
            .create_asset(&store, "D1", MSISDN, "1234", "7", "active")
            .await
            .unwrap();

        assert_eq!(store.change_log(MSISDN).len(), 3);
        let entries = HistoryReconstructor::reconstruct(&store, MSISDN).await.unwrap();
        assert_eq!(balances(&entries), vec![5.0, 7.0]);
    }

    #[tokio::test]
    async fn interrupted_stream_still_releases_iterator() {
        let contract = AssetContract::default();
        let store = InMemoryWorldState::new();
        contract
            .create_asset(&store, "D1", MSISDN, "1234", "5", "active")
            .await
            .unwrap();
        contract
            .update_balance(&store, MSISDN, "1", "debit", "x")
            .await
            .unwrap();
        store.fail_history_after(Some(1));

        assert!(HistoryReconstructor::reconstruct(&store, MSISDN).await.is_err());
        assert_eq!(store.open_iterators(), 0);
    }
}
