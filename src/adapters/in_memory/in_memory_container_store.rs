// In memory implementation of the ContainerStore port.
//
// Purpose
// - Support engine tests and local development without a database.
//
// Responsibilities
// - Store container rows in a map keyed by id.
// - Enforce optimistic concurrency on bulk save: every saved row must carry the
//   stored version, and a successful save bumps it. All or nothing.
// - Offer test hooks: rows hidden from bulk reads (lagging replica), scheduled
//   concurrent writers, call counters, and an offline switch.

use crate::core::association::container::{Container, ContainerId};
use crate::core::ports::{ContainerStore, StoreError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

type ConcurrentWrite = Box<dyn FnOnce(&mut Container) + Send + Sync>;

#[derive(Default)]
pub struct InMemoryContainerStore {
    rows: RwLock<HashMap<ContainerId, Container>>,
    hidden_from_bulk: RwLock<HashSet<ContainerId>>,
    concurrent_writes: Mutex<VecDeque<(ContainerId, ConcurrentWrite)>>,
    bulk_get_calls: AtomicUsize,
    get_by_id_calls: AtomicUsize,
    bulk_save_calls: AtomicUsize,
    is_offline: bool,
}

impl InMemoryContainerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_containers(containers: impl IntoIterator<Item = Container>) -> Self {
        Self {
            rows: RwLock::new(
                containers
                    .into_iter()
                    .map(|container| (container.id, container))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn insert(&self, container: Container) {
        self.rows.write().await.insert(container.id, container);
    }

    pub async fn snapshot(&self, id: ContainerId) -> Option<Container> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Leave `id` out of bulk reads while still serving it from `get_by_id`.
    pub async fn hide_from_bulk(&self, id: ContainerId) {
        self.hidden_from_bulk.write().await.insert(id);
    }

    /// Queue a write by another worker that commits right before the next bulk save.
    pub async fn schedule_concurrent_write<F>(&self, id: ContainerId, write: F)
    where
        F: FnOnce(&mut Container) + Send + Sync + 'static,
    {
        self.concurrent_writes
            .lock()
            .await
            .push_back((id, Box::new(write)));
    }

    pub fn bulk_get_calls(&self) -> usize {
        self.bulk_get_calls.load(Ordering::SeqCst)
    }

    pub fn get_by_id_calls(&self) -> usize {
        self.get_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn bulk_save_calls(&self) -> usize {
        self.bulk_save_calls.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Container store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContainerStore for InMemoryContainerStore {
    async fn bulk_get_by_ids(&self, ids: &[ContainerId]) -> Result<Vec<Container>, StoreError> {
        self.ensure_online()?;
        self.bulk_get_calls.fetch_add(1, Ordering::SeqCst);

        let hidden = self.hidden_from_bulk.read().await;
        let rows = self.rows.read().await;
        Ok(ids
            .iter()
            .filter(|id| !hidden.contains(*id))
            .filter_map(|id| rows.get(id).cloned())
            .collect())
    }

    async fn get_by_id(&self, id: ContainerId) -> Result<Option<Container>, StoreError> {
        self.ensure_online()?;
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn bulk_save(&self, containers: Vec<Container>) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.bulk_save_calls.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.write().await;
        if let Some((id, write)) = self.concurrent_writes.lock().await.pop_front() {
            if let Some(row) = rows.get_mut(&id) {
                write(row);
                row.version += 1;
            }
        }

        for container in &containers {
            let Some(stored) = rows.get(&container.id) else {
                return Err(StoreError::Backend(format!(
                    "container {} does not exist",
                    container.id
                )));
            };
            if stored.version != container.version {
                return Err(StoreError::VersionMismatch {
                    container_id: container.id,
                    expected: container.version,
                    actual: stored.version,
                });
            }
        }

        for mut container in containers {
            container.version += 1;
            rows.insert(container.id, container);
        }
        Ok(())
    }
}
