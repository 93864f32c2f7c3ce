// Apply an ordered batch of mutation events to loaded containers.
//
// Purpose
// - Produce the set of containers to persist for one attempt.
//
// Rules
// - Events are applied in batch order, never regrouped by container, so the last
//   event for a (container, user, member) key wins.
// - Events whose container was not loaded are skipped.
// - Only containers whose associations differ from the loaded copy are returned.
//
// Boundaries
// - Works on a private copy of the loaded map. Reapplying the same batch to a
//   freshly loaded map is how conflicts are resolved.

use crate::core::association::container::{Container, ContainerId};
use crate::core::association::event::MutationEvent;
use crate::core::association::merge::merge_member;
use std::collections::HashMap;

pub type ContainerMap = HashMap<ContainerId, Container>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBatch {
    /// Changed containers, ordered by id, still carrying their loaded version.
    pub changed: Vec<Container>,
    pub applied: usize,
    pub skipped: usize,
}

/// Returns false when the event's container is not in the map.
pub fn apply_event(containers: &mut ContainerMap, event: &MutationEvent) -> bool {
    let Some(container) = containers.get_mut(&event.container_id) else {
        return false;
    };
    merge_member(
        &mut container.associations,
        event.user_id,
        event.member_id,
        event.action,
    );
    true
}

pub fn apply_batch(loaded: &ContainerMap, events: &[MutationEvent]) -> AppliedBatch {
    let mut working = loaded.clone();
    let mut applied = 0;
    let mut skipped = 0;

    for event in events {
        if apply_event(&mut working, event) {
            applied += 1;
        } else {
            skipped += 1;
        }
    }

    let mut changed: Vec<Container> = working
        .into_values()
        .filter(|container| {
            loaded
                .get(&container.id)
                .is_some_and(|original| original.associations != container.associations)
        })
        .collect();
    changed.sort_by_key(|container| container.id);

    AppliedBatch {
        changed,
        applied,
        skipped,
    }
}

#[cfg(test)]
mod apply_batch_tests {
    use super::*;
    use crate::core::association::container::ContainerKind;
    use crate::core::association::event::Action;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    #[fixture]
    fn loaded() -> ContainerMap {
        ContainerMap::from([
            (5, Container::new(5, ContainerKind::Category).with_version(2)),
            (7, Container::new(7, ContainerKind::Category).with_members(2, [200])),
        ])
    }

    #[rstest]
    fn add_then_remove_leaves_the_member_absent(loaded: ContainerMap) {
        let result = apply_batch(
            &loaded,
            &[
                MutationEvent::new(5, 1, 100, Action::Add),
                MutationEvent::new(5, 1, 100, Action::Remove),
            ],
        );
        assert!(result.changed.is_empty());
        assert_eq!(result.applied, 2);
    }

    #[rstest]
    fn remove_then_add_leaves_the_member_present(loaded: ContainerMap) {
        let result = apply_batch(
            &loaded,
            &[
                MutationEvent::new(5, 1, 100, Action::Remove),
                MutationEvent::new(5, 1, 100, Action::Add),
            ],
        );
        assert_eq!(result.changed.len(), 1);
        assert_eq!(result.changed[0].members_of(1), Some(&BTreeSet::from([100])));
    }

    #[rstest]
    fn it_should_keep_batch_order_across_interleaved_containers(loaded: ContainerMap) {
        let result = apply_batch(
            &loaded,
            &[
                MutationEvent::new(5, 1, 100, Action::Add),
                MutationEvent::new(7, 2, 201, Action::Add),
                MutationEvent::new(5, 1, 101, Action::Add),
                MutationEvent::new(7, 2, 200, Action::Remove),
                MutationEvent::new(5, 1, 100, Action::Remove),
            ],
        );
        assert_eq!(result.changed.len(), 2);
        assert_eq!(result.changed[0].id, 5);
        assert_eq!(result.changed[0].members_of(1), Some(&BTreeSet::from([101])));
        assert_eq!(result.changed[1].id, 7);
        assert_eq!(result.changed[1].members_of(2), Some(&BTreeSet::from([201])));
    }

    #[rstest]
    fn it_should_skip_events_for_containers_that_were_not_loaded(loaded: ContainerMap) {
        let result = apply_batch(
            &loaded,
            &[
                MutationEvent::new(9, 1, 100, Action::Add),
                MutationEvent::new(5, 1, 100, Action::Add),
            ],
        );
        assert_eq!(result.applied, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.changed.len(), 1);
        assert_eq!(result.changed[0].id, 5);
    }

    #[rstest]
    fn reapplying_to_a_converged_state_changes_nothing(loaded: ContainerMap) {
        let events = [
            MutationEvent::new(5, 1, 100, Action::Add),
            MutationEvent::new(7, 3, 300, Action::Update),
        ];
        let first = apply_batch(&loaded, &events);
        let converged: ContainerMap = first
            .changed
            .into_iter()
            .map(|container| (container.id, container))
            .collect();
        let second = apply_batch(&converged, &events);
        assert!(second.changed.is_empty());
        assert_eq!(second.applied, 2);
    }

    #[rstest]
    fn it_should_not_touch_the_loaded_map_or_versions(loaded: ContainerMap) {
        let snapshot = loaded.clone();
        let result = apply_batch(&loaded, &[MutationEvent::new(5, 1, 100, Action::Add)]);
        assert_eq!(loaded, snapshot);
        assert_eq!(result.changed[0].version, 2);
    }
}
