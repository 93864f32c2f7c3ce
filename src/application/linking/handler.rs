// Single-event linking handler.
//
// Purpose
// - Repoint a member's cached container references of one container kind, one event at a time.
//
// Responsibilities
// - Parse, load the member row, merge, save.
// - Keep failures local to the event: a broken record or a failing save is logged
//   and the remaining events of the batch are still handled.
//
// Boundaries
// - Atomicity comes from the member store's single-row save. There is no retry loop.

use crate::application::consumer::handler::{BatchHandler, BatchReport};
use crate::application::errors::SyncError;
use crate::application::sync::receiver::receive_one;
use crate::core::association::container::ContainerKind;
use crate::core::association::event::{MutationEvent, RawEvent};
use crate::core::member_link::apply::apply_link;
use crate::core::ports::MemberLinkStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    Unchanged,
    MemberMissing,
    Malformed,
    Failed,
}

pub struct MemberLinkHandler<TStore>
where
    TStore: MemberLinkStore + 'static,
{
    kind: ContainerKind,
    store: Arc<TStore>,
}

impl<TStore> MemberLinkHandler<TStore>
where
    TStore: MemberLinkStore + 'static,
{
    pub fn new(kind: ContainerKind, store: Arc<TStore>) -> Self {
        Self { kind, store }
    }

    pub async fn handle_one(&self, raw: &RawEvent) -> LinkOutcome {
        let Some(event) = receive_one(raw) else {
            return LinkOutcome::Malformed;
        };
        match self.link(&event).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    offset = raw.offset,
                    kind = %self.kind,
                    member_id = event.member_id,
                    container_id = event.container_id,
                    error = %err,
                    "member link failed"
                );
                LinkOutcome::Failed
            }
        }
    }

    async fn link(&self, event: &MutationEvent) -> anyhow::Result<LinkOutcome> {
        let Some(mut row) = self.store.load_member(event.member_id, self.kind).await? else {
            warn!(
                kind = %self.kind,
                member_id = event.member_id,
                "member not found, skipping link event"
            );
            return Ok(LinkOutcome::MemberMissing);
        };
        if !apply_link(&mut row, event) {
            debug!(member_id = event.member_id, "member references already up to date");
            return Ok(LinkOutcome::Unchanged);
        }
        self.store.save_member(row).await?;
        Ok(LinkOutcome::Linked)
    }
}

#[async_trait]
impl<TStore> BatchHandler for MemberLinkHandler<TStore>
where
    TStore: MemberLinkStore + 'static,
{
    async fn handle_batch(&self, events: &[RawEvent]) -> Result<BatchReport, SyncError> {
        let mut report = BatchReport {
            received: events.len(),
            attempts: 1,
            ..BatchReport::default()
        };
        for raw in events {
            match self.handle_one(raw).await {
                LinkOutcome::Linked => {
                    report.applied += 1;
                    report.saved += 1;
                }
                LinkOutcome::Unchanged => report.applied += 1,
                LinkOutcome::Malformed => report.dropped += 1,
                LinkOutcome::MemberMissing | LinkOutcome::Failed => report.skipped += 1,
            }
        }
        report.processed_at = Utc::now().timestamp_millis();
        info!(
            kind = %self.kind,
            received = report.received,
            saved = report.saved,
            dropped = report.dropped,
            skipped = report.skipped,
            "member link batch handled"
        );
        Ok(report)
    }
}
