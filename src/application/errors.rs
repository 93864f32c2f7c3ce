use crate::core::ports::StoreError;
use thiserror::Error;

/// Batch-level failure. Any of these leaves the batch unacknowledged.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("optimistic conflict still present after {attempts} attempts: {source}")]
    ConflictRetriesExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
