use crate::core::association::container::ContainerId;
use crate::core::association::event::MutationEvent;
use std::collections::HashSet;

/// Distinct container ids referenced by a batch, in first-seen order.
pub fn impacted_container_ids(events: &[MutationEvent]) -> Vec<ContainerId> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .iter()
        .map(|event| event.container_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
