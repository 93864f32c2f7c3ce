// Association sync engine for one container kind.
//
// Flow per batch
// - receive: parse raw records, dropping malformed ones
// - collect: distinct impacted container ids
// - persist: bulk load, apply in batch order, bulk save, retry on conflict
//
// The engine holds no state between batches; the container map lives only for
// the duration of one persist attempt.

use crate::application::consumer::handler::{BatchHandler, BatchReport};
use crate::application::errors::SyncError;
use crate::application::sync::persister::persist_with_retry;
use crate::application::sync::receiver::receive_batch;
use crate::config::SyncConfig;
use crate::core::association::container::ContainerKind;
use crate::core::association::event::RawEvent;
use crate::core::association::impact::impacted_container_ids;
use crate::core::ports::ContainerStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub batch_limit: usize,
    pub max_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_limit: 100,
            max_attempts: 3,
        }
    }
}

impl From<&SyncConfig> for EngineSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            batch_limit: config.batch_limit,
            max_attempts: config.max_attempts,
        }
    }
}

pub struct AssociationSyncEngine<TStore>
where
    TStore: ContainerStore + 'static,
{
    kind: ContainerKind,
    store: Arc<TStore>,
    settings: EngineSettings,
}

impl<TStore> AssociationSyncEngine<TStore>
where
    TStore: ContainerStore + 'static,
{
    pub fn new(kind: ContainerKind, store: Arc<TStore>, settings: EngineSettings) -> Self {
        Self {
            kind,
            store,
            settings,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub async fn process_batch(&self, raw: &[RawEvent]) -> Result<BatchReport, SyncError> {
        let received = receive_batch(raw, self.settings.batch_limit);
        let impacted = impacted_container_ids(&received.events);

        let outcome = persist_with_retry(
            self.store.as_ref(),
            &impacted,
            &received.events,
            self.settings.max_attempts,
        )
        .await?;

        let report = BatchReport {
            received: raw.len(),
            applied: outcome.applied,
            dropped: received.dropped,
            skipped: outcome.skipped,
            impacted: impacted.len(),
            unresolved: outcome.unresolved,
            saved: outcome.saved,
            attempts: outcome.attempts,
            processed_at: Utc::now().timestamp_millis(),
        };
        info!(
            kind = %self.kind,
            received = report.received,
            dropped = report.dropped,
            impacted = report.impacted,
            unresolved = report.unresolved.len(),
            saved = report.saved,
            attempts = report.attempts,
            "association batch persisted"
        );
        Ok(report)
    }
}

#[async_trait]
impl<TStore> BatchHandler for AssociationSyncEngine<TStore>
where
    TStore: ContainerStore + 'static,
{
    async fn handle_batch(&self, events: &[RawEvent]) -> Result<BatchReport, SyncError> {
        self.process_batch(events).await
    }
}

#[cfg(test)]
mod association_sync_engine_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_container_store::InMemoryContainerStore;
    use crate::core::association::container::Container;
    use crate::core::association::event::RawEvent;
    use crate::core::ports::StoreError;
    use crate::test_support::fixtures::containers::category;
    use crate::test_support::fixtures::events::mutation_event::{add, raw_batch, remove, update};
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    type BeforeEachReturn = (
        Arc<InMemoryContainerStore>,
        AssociationSyncEngine<InMemoryContainerStore>,
    );

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let store = Arc::new(InMemoryContainerStore::from_containers([
            category(5),
            category(7),
        ]));
        let engine = AssociationSyncEngine::new(
            ContainerKind::Category,
            store.clone(),
            EngineSettings::default(),
        );
        (store, engine)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resolve_the_mixed_batch_with_one_bulk_save(before_each: BeforeEachReturn) {
        let (store, engine) = before_each;
        store.hide_from_bulk(7).await;

        let report = engine
            .process_batch(&raw_batch(&[
                add(5, 1, 100),
                add(5, 1, 101),
                remove(5, 1, 100),
                add(7, 2, 200),
            ]))
            .await
            .expect("batch failed");

        assert_eq!(store.bulk_get_calls(), 1);
        assert_eq!(store.get_by_id_calls(), 1);
        assert_eq!(store.bulk_save_calls(), 1);
        assert_eq!(report.saved, 2);
        assert_eq!(report.attempts, 1);
        assert_eq!(
            store.snapshot(5).await.unwrap().members_of(1),
            Some(&BTreeSet::from([101]))
        );
        assert_eq!(
            store.snapshot(7).await.unwrap().members_of(2),
            Some(&BTreeSet::from([200]))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_be_idempotent_under_redelivery(before_each: BeforeEachReturn) {
        let (store, engine) = before_each;
        let raw = raw_batch(&[add(5, 1, 100), update(5, 1, 101)]);

        engine.process_batch(&raw).await.expect("first delivery failed");
        let converged = store.snapshot(5).await.unwrap();
        let report = engine.process_batch(&raw).await.expect("redelivery failed");

        assert_eq!(report.saved, 0);
        assert_eq!(store.bulk_save_calls(), 1);
        assert_eq!(store.snapshot(5).await.unwrap(), converged);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_count_dropped_and_skipped_events(before_each: BeforeEachReturn) {
        let (store, engine) = before_each;
        let mut raw = raw_batch(&[add(5, 1, 100), add(42, 1, 100)]);
        raw.push(RawEvent::new(50, "not json"));

        let report = engine.process_batch(&raw).await.expect("batch failed");

        assert_eq!(report.received, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.impacted, 2);
        assert_eq!(report.unresolved, vec![42]);
        assert_eq!(store.snapshot(42).await, None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_touch_the_store_for_a_batch_of_malformed_events(
        before_each: BeforeEachReturn,
    ) {
        let (store, engine) = before_each;
        let report = engine
            .process_batch(&[RawEvent::new(0, "{}"), RawEvent::new(1, "[]")])
            .await
            .expect("batch failed");
        assert_eq!(report.dropped, 2);
        assert_eq!(store.bulk_get_calls(), 0);
        assert_eq!(store.bulk_save_calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_propagate_exhausted_conflicts() {
        let store = Arc::new(InMemoryContainerStore::from_containers([category(5)]));
        let engine = AssociationSyncEngine::new(
            ContainerKind::Category,
            store.clone(),
            EngineSettings {
                batch_limit: 10,
                max_attempts: 2,
            },
        );
        for _ in 0..2 {
            store
                .schedule_concurrent_write(5, |container: &mut Container| {
                    container.associations.entry(3).or_default().insert(300);
                })
                .await;
        }

        let result = engine.process_batch(&raw_batch(&[add(5, 1, 100)])).await;

        assert!(matches!(
            result,
            Err(SyncError::ConflictRetriesExhausted { attempts: 2, .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_propagate_store_failures() {
        let mut store = InMemoryContainerStore::from_containers([category(5)]);
        store.toggle_offline();
        let engine = AssociationSyncEngine::new(
            ContainerKind::Category,
            Arc::new(store),
            EngineSettings::default(),
        );
        let result = engine.handle_batch(&raw_batch(&[add(5, 1, 100)])).await;
        assert!(matches!(result, Err(SyncError::Store(StoreError::Backend(_)))));
    }
}
