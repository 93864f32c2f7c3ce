// Bulk loader for the containers a batch touches.
//
// Purpose
// - One bulk fetch for every impacted id, then single fetches only for ids the
//   bulk result did not return.
//
// Responsibilities
// - Log each fallback and each id that stays unresolved.
// - Propagate store failures untouched; the caller decides about retries.

use crate::core::association::container::ContainerId;
use crate::core::association::mutate::ContainerMap;
use crate::core::ports::{ContainerStore, StoreError};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadedContainers {
    pub containers: ContainerMap,
    pub unresolved: Vec<ContainerId>,
    pub fallback_hits: usize,
}

/// `ids` must be distinct, as produced by `impacted_container_ids`.
pub async fn load_impacted<TStore>(
    store: &TStore,
    ids: &[ContainerId],
) -> Result<LoadedContainers, StoreError>
where
    TStore: ContainerStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(LoadedContainers::default());
    }

    let requested: HashSet<ContainerId> = ids.iter().copied().collect();
    let mut containers: ContainerMap = store
        .bulk_get_by_ids(ids)
        .await?
        .into_iter()
        .filter(|container| requested.contains(&container.id))
        .map(|container| (container.id, container))
        .collect();
    debug!(
        requested = ids.len(),
        returned = containers.len(),
        "bulk loaded containers"
    );

    let mut unresolved = Vec::new();
    let mut fallback_hits = 0;
    if containers.len() < ids.len() {
        for &id in ids {
            if containers.contains_key(&id) {
                continue;
            }
            warn!(container_id = id, "container missing from bulk load, fetching it alone");
            match store.get_by_id(id).await? {
                Some(container) => {
                    fallback_hits += 1;
                    containers.insert(id, container);
                }
                None => {
                    warn!(
                        container_id = id,
                        "container unresolved after fallback, its events are skipped this cycle"
                    );
                    unresolved.push(id);
                }
            }
        }
    }

    Ok(LoadedContainers {
        containers,
        unresolved,
        fallback_hits,
    })
}
