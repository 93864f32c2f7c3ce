// Builders for mutation events and the raw records the transport would deliver.
// The default event is read from json/association_changed.json.

use crate::core::association::container::{ContainerId, MemberId, UserId};
use crate::core::association::event::v1::association_changed::AssociationChangedV1;
use crate::core::association::event::{Action, MutationEvent, RawEvent};

const DEFAULT_EVENT_JSON: &str = include_str!("json/association_changed.json");

pub struct MutationEventBuilder {
    inner: MutationEvent,
}

impl Default for MutationEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl MutationEventBuilder {
    pub fn new() -> Self {
        let dto: AssociationChangedV1 = serde_json::from_str(DEFAULT_EVENT_JSON).unwrap();
        Self {
            inner: MutationEvent {
                user_id: dto.user_id,
                container_id: dto.container_id,
                member_id: dto.member_id,
                action: dto
                    .action
                    .as_ref()
                    .and_then(serde_json::Value::as_str)
                    .and_then(Action::from_wire)
                    .unwrap(),
                display_name: dto.display_name,
            },
        }
    }

    pub fn user_id(mut self, v: UserId) -> Self {
        self.inner.user_id = v;
        self
    }

    pub fn container_id(mut self, v: ContainerId) -> Self {
        self.inner.container_id = v;
        self
    }

    pub fn member_id(mut self, v: MemberId) -> Self {
        self.inner.member_id = v;
        self
    }

    pub fn action(mut self, v: Action) -> Self {
        self.inner.action = v;
        self
    }

    pub fn display_name(mut self, v: Option<&str>) -> Self {
        self.inner.display_name = v.map(str::to_string);
        self
    }

    pub fn build(self) -> MutationEvent {
        self.inner
    }

    pub fn raw(self, offset: u64) -> RawEvent {
        to_raw(offset, &self.inner)
    }

    /// Raw record whose action field is replaced verbatim (or left out).
    pub fn raw_with_action(self, offset: u64, action: Option<&str>) -> RawEvent {
        let mut dto = AssociationChangedV1::from(&self.inner);
        dto.action = action.map(|name| serde_json::Value::String(name.to_string()));
        RawEvent::new(offset, serde_json::to_string(&dto).unwrap())
    }
}

pub fn add(container_id: ContainerId, user_id: UserId, member_id: MemberId) -> MutationEvent {
    MutationEvent::new(container_id, user_id, member_id, Action::Add)
}

pub fn remove(container_id: ContainerId, user_id: UserId, member_id: MemberId) -> MutationEvent {
    MutationEvent::new(container_id, user_id, member_id, Action::Remove)
}

pub fn update(container_id: ContainerId, user_id: UserId, member_id: MemberId) -> MutationEvent {
    MutationEvent::new(container_id, user_id, member_id, Action::Update)
}

pub fn to_raw(offset: u64, event: &MutationEvent) -> RawEvent {
    let dto = AssociationChangedV1::from(event);
    RawEvent::new(offset, serde_json::to_string(&dto).unwrap())
}

pub fn raw_batch(events: &[MutationEvent]) -> Vec<RawEvent> {
    events
        .iter()
        .enumerate()
        .map(|(offset, event)| to_raw(offset as u64, event))
        .collect()
}
