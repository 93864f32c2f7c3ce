// The merge rule for one association key.
//
// - ADD and UPDATE are set union, REMOVE is set difference.
// - Applying the same event twice is a no-op the second time.
// - A user whose member set becomes empty is removed from the map.

use crate::core::association::container::{Associations, MemberId, UserId};
use crate::core::association::event::Action;
use std::collections::BTreeSet;

/// Returns true when the set changed.
pub fn merge_into_set<T: Ord>(set: &mut BTreeSet<T>, value: T, action: Action) -> bool {
    match action {
        Action::Remove => set.remove(&value),
        Action::Add | Action::Update => set.insert(value),
    }
}

pub fn merge_member(
    associations: &mut Associations,
    user_id: UserId,
    member_id: MemberId,
    action: Action,
) -> bool {
    let mut members = associations.remove(&user_id).unwrap_or_default();
    let changed = merge_into_set(&mut members, member_id, action);
    if !members.is_empty() {
        associations.insert(user_id, members);
    }
    changed
}
