// Batch receiver: parse every raw record independently and keep arrival order.
//
// Responsibilities
// - Drop and log malformed records without failing the batch.
// - Log each action that fell back to ADD.

use crate::core::association::event::{MutationEvent, RawEvent};
use crate::core::association::parse::{ActionFallback, parse_event};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReceivedBatch {
    pub events: Vec<MutationEvent>,
    pub dropped: usize,
}

/// Parses one record, logging why it was dropped or defaulted.
pub fn receive_one(raw: &RawEvent) -> Option<MutationEvent> {
    match parse_event(raw) {
        Ok(parsed) => {
            match &parsed.fallback {
                Some(ActionFallback::Missing) => {
                    debug!(offset = raw.offset, "event has no action, treating it as ADD");
                }
                Some(ActionFallback::Unrecognized(action)) => {
                    warn!(
                        offset = raw.offset,
                        action = %action,
                        "unrecognized action, treating it as ADD"
                    );
                }
                None => {}
            }
            Some(parsed.event)
        }
        Err(error) => {
            warn!(offset = raw.offset, %error, "dropping malformed event");
            None
        }
    }
}

pub fn receive_batch(raw: &[RawEvent], batch_limit: usize) -> ReceivedBatch {
    if raw.len() > batch_limit {
        warn!(
            received = raw.len(),
            batch_limit, "batch exceeds the configured limit, processing it in full"
        );
    }

    let mut batch = ReceivedBatch {
        events: Vec::with_capacity(raw.len()),
        dropped: 0,
    };
    for record in raw {
        match receive_one(record) {
            Some(event) => batch.events.push(event),
            None => batch.dropped += 1,
        }
    }
    batch
}
