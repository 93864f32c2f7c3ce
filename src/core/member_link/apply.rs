use crate::core::association::event::MutationEvent;
use crate::core::association::merge::merge_into_set;
use crate::core::member_link::member_row::MemberRow;

/// Repoint one member row. Returns true when its references changed.
pub fn apply_link(row: &mut MemberRow, event: &MutationEvent) -> bool {
    merge_into_set(&mut row.container_ids, event.container_id, event.action)
}
