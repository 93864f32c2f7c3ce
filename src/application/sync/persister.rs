// Conflict-aware persistence of one batch.
//
// Purpose
// - Load, apply and bulk save the batch, and on an optimistic conflict start over
//   from freshly loaded containers with the entire ordered event list.
//
// Rules
// - At most `max_attempts` saves are tried; the last conflict is returned as
//   SyncError::ConflictRetriesExhausted.
// - Store failures that are not conflicts are returned on the spot.
// - Nothing is saved when the batch changes no container.

use crate::application::errors::SyncError;
use crate::application::sync::loader::load_impacted;
use crate::core::association::container::ContainerId;
use crate::core::association::event::MutationEvent;
use crate::core::association::mutate::apply_batch;
use crate::core::ports::ContainerStore;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    pub attempts: u32,
    pub saved: usize,
    pub applied: usize,
    pub skipped: usize,
    pub unresolved: Vec<ContainerId>,
}

pub async fn persist_with_retry<TStore>(
    store: &TStore,
    impacted: &[ContainerId],
    events: &[MutationEvent],
    max_attempts: u32,
) -> Result<PersistOutcome, SyncError>
where
    TStore: ContainerStore + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let loaded = load_impacted(store, impacted).await?;
        let batch = apply_batch(&loaded.containers, events);
        let outcome = PersistOutcome {
            attempts: attempt,
            saved: batch.changed.len(),
            applied: batch.applied,
            skipped: batch.skipped,
            unresolved: loaded.unresolved,
        };

        if batch.changed.is_empty() {
            debug!(attempt, "batch changed no container, nothing to save");
            return Ok(outcome);
        }

        match store.bulk_save(batch.changed).await {
            Ok(()) => return Ok(outcome),
            Err(error) if error.is_conflict() && attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    %error,
                    "optimistic conflict, reloading containers and reapplying the batch"
                );
            }
            Err(error) if error.is_conflict() => {
                return Err(SyncError::ConflictRetriesExhausted {
                    attempts: attempt,
                    source: error,
                });
            }
            Err(error) => return Err(SyncError::Store(error)),
        }
    }
}
