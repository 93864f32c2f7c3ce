// Container row: the owning side of a container/expense association.
//
// Notes
// - `associations` never holds a user key with an empty member set.
// - A stored row with a null association map reads as empty.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type ContainerId = i64;
pub type UserId = i64;
pub type MemberId = i64;

pub type Associations = BTreeMap<UserId, BTreeSet<MemberId>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerKind {
    Budget,
    Category,
    PaymentMethod,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::Budget,
        ContainerKind::Category,
        ContainerKind::PaymentMethod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Budget => "budget",
            ContainerKind::Category => "category",
            ContainerKind::PaymentMethod => "payment_method",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub version: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub associations: Associations,
}

impl Container {
    pub fn new(id: ContainerId, kind: ContainerKind) -> Self {
        Self {
            id,
            kind,
            version: 0,
            associations: Associations::new(),
        }
    }

    /// Seeds the members of one user. An empty iterator leaves the user absent.
    pub fn with_members(
        mut self,
        user_id: UserId,
        members: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        let members: BTreeSet<MemberId> = members.into_iter().collect();
        if members.is_empty() {
            self.associations.remove(&user_id);
        } else {
            self.associations.insert(user_id, members);
        }
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn members_of(&self, user_id: UserId) -> Option<&BTreeSet<MemberId>> {
        self.associations.get(&user_id)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Associations, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Associations>::deserialize(deserializer).map(Option::unwrap_or_default)
}
