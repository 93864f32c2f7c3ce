use crate::core::association::container::{ContainerId, ContainerKind, MemberId, UserId};
use std::collections::BTreeSet;

/// A member (expense) with the containers of one kind it currently points at.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub member_id: MemberId,
    pub user_id: UserId,
    pub kind: ContainerKind,
    #[serde(default)]
    pub container_ids: BTreeSet<ContainerId>,
}

impl MemberRow {
    pub fn new(member_id: MemberId, user_id: UserId, kind: ContainerKind) -> Self {
        Self {
            member_id,
            user_id,
            kind,
            container_ids: BTreeSet::new(),
        }
    }

    /// Store key: one row per member and container kind.
    pub fn key(&self) -> (MemberId, ContainerKind) {
        (self.member_id, self.kind)
    }

    pub fn with_containers(mut self, ids: impl IntoIterator<Item = ContainerId>) -> Self {
        self.container_ids.extend(ids);
        self
    }
}
