// Root event types for association changes.
//
// Purpose
// - `RawEvent` is one record as delivered by the transport.
// - `MutationEvent` is the normalized form every downstream step works on.
//
// Versioning and evolution
// - The sibling folder 'event/' holds versioned wire payloads (for example: v1/).
// - Prefer additive changes. A breaking wire change gets a new version module.

use crate::core::association::container::{ContainerId, MemberId, UserId};

pub mod v1 {
    pub mod association_changed;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Remove,
    Update,
}

impl Action {
    /// Strict, case-insensitive lookup of a wire action name.
    pub fn from_wire(value: &str) -> Option<Action> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADD" => Some(Action::Add),
            "REMOVE" => Some(Action::Remove),
            "UPDATE" => Some(Action::Update),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Action::Add => "ADD",
            Action::Remove => "REMOVE",
            Action::Update => "UPDATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEvent {
    pub user_id: UserId,
    pub container_id: ContainerId,
    pub member_id: MemberId,
    pub action: Action,
    pub display_name: Option<String>,
}

impl MutationEvent {
    pub fn new(
        container_id: ContainerId,
        user_id: UserId,
        member_id: MemberId,
        action: Action,
    ) -> Self {
        Self {
            user_id,
            container_id,
            member_id,
            action,
            display_name: None,
        }
    }

    /// The (container, user, member) key whose relative order a batch preserves.
    pub fn key(&self) -> (ContainerId, UserId, MemberId) {
        (self.container_id, self.user_id, self.member_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub offset: u64,
    pub payload: String,
}

impl RawEvent {
    pub fn new(offset: u64, payload: impl Into<String>) -> Self {
        Self {
            offset,
            payload: payload.into(),
        }
    }
}
