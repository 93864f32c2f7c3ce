// Inbound port for the consumer loop: anything that can process one delivered batch.
//
// Contract
// - Ok means every event was either applied or deliberately dropped and the batch
//   can be acknowledged.
// - Err means nothing may be acknowledged; the transport redelivers the batch.

use crate::application::errors::SyncError;
use crate::core::association::container::ContainerId;
use crate::core::association::event::RawEvent;
use async_trait::async_trait;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub received: usize,
    pub applied: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub impacted: usize,
    pub unresolved: Vec<ContainerId>,
    pub saved: usize,
    pub attempts: u32,
    /// Epoch milliseconds.
    pub processed_at: i64,
}

#[async_trait]
pub trait BatchHandler: Send + Sync {
    async fn handle_batch(&self, events: &[RawEvent]) -> Result<BatchReport, SyncError>;
}
