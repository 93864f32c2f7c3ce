// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe abstract input and output capabilities as traits (ContainerStore, MemberLinkStore, BatchSource).
//
// Responsibilities
// - Keep the sync engine independent of any database or broker by coding against traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - Provide in memory implementations for tests and local development.

use crate::core::association::container::{Container, ContainerId, ContainerKind, MemberId};
use crate::core::association::event::RawEvent;
use crate::core::member_link::member_row::MemberRow;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version mismatch on container {container_id}: expected {expected}, actual {actual}")]
    VersionMismatch {
        container_id: ContainerId,
        expected: i64,
        actual: i64,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionMismatch { .. })
    }
}

/// Persistent owner of container rows.
///
/// `bulk_save` is all-or-nothing: when any container carries a stale version
/// nothing is written and `StoreError::VersionMismatch` is returned.
#[async_trait]
pub trait ContainerStore: Send + Sync {
    async fn bulk_get_by_ids(&self, ids: &[ContainerId]) -> Result<Vec<Container>, StoreError>;
    async fn get_by_id(&self, id: ContainerId) -> Result<Option<Container>, StoreError>;
    async fn bulk_save(&self, containers: Vec<Container>) -> Result<(), StoreError>;
}

/// Single-row store for a member's cached container references.
/// Rows are keyed by member and container kind. A save is one row-level transaction.
#[async_trait]
pub trait MemberLinkStore: Send + Sync {
    async fn load_member(
        &self,
        member_id: MemberId,
        kind: ContainerKind,
    ) -> anyhow::Result<Option<MemberRow>>;
    async fn save_member(&self, row: MemberRow) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unknown delivery tag {0}")]
    UnknownDelivery(u64),

    #[error("transport backend error: {0}")]
    Backend(String),
}

/// One delivery from the transport. Acknowledge or reject it by `delivery_tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub delivery_tag: u64,
    pub topic: String,
    pub events: Vec<RawEvent>,
}

#[async_trait]
pub trait BatchSource: Send + Sync {
    async fn poll(&self, topic: &str, max_events: usize) -> Result<Option<Batch>, TransportError>;
    async fn ack(&self, batch: &Batch) -> Result<(), TransportError>;
    async fn nack(&self, batch: &Batch) -> Result<(), TransportError>;
}
