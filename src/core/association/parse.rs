// Turn one raw transport record into a normalized mutation event.
//
// Rules
// - The payload must deserialize as AssociationChangedV1 and carry positive ids.
// - A missing or unrecognized action falls back to ADD. The fallback is reported
//   back to the caller so it can be logged; unknown actions are kept only for
//   backward compatibility with older producers.
// - A non-string action is unrecognized, not malformed.

use crate::core::association::event::v1::association_changed::AssociationChangedV1;
use crate::core::association::event::{Action, MutationEvent, RawEvent};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive id, got {value}")]
    InvalidId { field: &'static str, value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFallback {
    Missing,
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub event: MutationEvent,
    pub fallback: Option<ActionFallback>,
}

pub fn parse_event(raw: &RawEvent) -> Result<ParsedEvent, ParseError> {
    let payload: AssociationChangedV1 = serde_json::from_str(&raw.payload)?;

    for (field, value) in [
        ("userId", payload.user_id),
        ("containerId", payload.container_id),
        ("memberId", payload.member_id),
    ] {
        if value <= 0 {
            return Err(ParseError::InvalidId { field, value });
        }
    }

    let (action, fallback) = match payload.action {
        None => (Action::Add, Some(ActionFallback::Missing)),
        Some(Value::String(name)) => match Action::from_wire(&name) {
            Some(action) => (action, None),
            None => (Action::Add, Some(ActionFallback::Unrecognized(name))),
        },
        Some(other) => (Action::Add, Some(ActionFallback::Unrecognized(other.to_string()))),
    };

    Ok(ParsedEvent {
        event: MutationEvent {
            user_id: payload.user_id,
            container_id: payload.container_id,
            member_id: payload.member_id,
            action,
            display_name: payload.display_name,
        },
        fallback,
    })
}
