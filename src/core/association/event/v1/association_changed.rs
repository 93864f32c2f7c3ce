// Version 1 wire payload published by the expense service on every link change.
//
// Notes
// - Keys are camelCase on the wire.
// - `action` stays a raw JSON value here; normalization happens in parse.rs.
// - `displayName` is informational. A non-string value reads as absent.

use crate::core::association::container::{ContainerId, MemberId, UserId};
use crate::core::association::event::MutationEvent;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationChangedV1 {
    pub user_id: UserId,
    pub container_id: ContainerId,
    pub member_id: MemberId,
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Some(value),
        _ => None,
    })
}

impl From<&MutationEvent> for AssociationChangedV1 {
    fn from(event: &MutationEvent) -> Self {
        Self {
            user_id: event.user_id,
            container_id: event.container_id,
            member_id: event.member_id,
            action: Some(Value::String(event.action.as_wire().to_string())),
            display_name: event.display_name.clone(),
        }
    }
}
