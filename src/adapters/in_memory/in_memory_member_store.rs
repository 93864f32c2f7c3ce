// In memory member row repository for the linking handler.
//
// Responsibilities
// - Store member rows keyed by member id and container kind; a save replaces the whole row.
// - Fail saves for chosen members, or everything when offline.

use crate::core::association::container::{ContainerKind, MemberId};
use crate::core::member_link::member_row::MemberRow;
use crate::core::ports::MemberLinkStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryMemberStore {
    rows: RwLock<HashMap<(MemberId, ContainerKind), MemberRow>>,
    failing_saves: RwLock<HashSet<MemberId>>,
    save_calls: AtomicUsize,
    is_offline: bool,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = MemberRow>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().map(|row| (row.key(), row)).collect()),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn fail_saves_for(&self, member_id: MemberId) {
        self.failing_saves.write().await.insert(member_id);
    }

    pub async fn snapshot(&self, member_id: MemberId, kind: ContainerKind) -> Option<MemberRow> {
        self.rows.read().await.get(&(member_id, kind)).cloned()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MemberLinkStore for InMemoryMemberStore {
    async fn load_member(
        &self,
        member_id: MemberId,
        kind: ContainerKind,
    ) -> anyhow::Result<Option<MemberRow>> {
        if self.is_offline {
            return Err(anyhow::anyhow!("Member store offline"));
        }
        Ok(self.rows.read().await.get(&(member_id, kind)).cloned())
    }

    async fn save_member(&self, row: MemberRow) -> anyhow::Result<()> {
        if self.is_offline {
            return Err(anyhow::anyhow!("Member store offline"));
        }
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_saves.read().await.contains(&row.member_id) {
            anyhow::bail!("save rejected for member {}", row.member_id);
        }
        self.rows.write().await.insert(row.key(), row);
        Ok(())
    }
}

#[cfg(test)]
mod in_memory_member_store_tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    #[fixture]
    fn row() -> MemberRow {
        MemberRow::new(100, 1, ContainerKind::Category).with_containers([5])
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_save_and_load_a_member(row: MemberRow) {
        let store = InMemoryMemberStore::new();
        store.save_member(row.clone()).await.expect("save failed");
        assert_eq!(
            store.load_member(100, ContainerKind::Category).await.unwrap(),
            Some(row)
        );
        assert_eq!(store.save_calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_saves_for_failing_members(row: MemberRow) {
        let store = InMemoryMemberStore::new();
        store.fail_saves_for(100).await;
        let result = store.save_member(row).await;
        assert!(result.unwrap_err().to_string().contains("save rejected for member 100"));
        assert_eq!(store.snapshot(100, ContainerKind::Category).await, None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_to_load_if_the_store_is_offline(row: MemberRow) {
        let mut store = InMemoryMemberStore::from_rows([row]);
        store.toggle_offline();
        let result = store.load_member(100, ContainerKind::Category).await;
        assert!(result.unwrap_err().to_string().contains("Member store offline"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_one_row_per_container_kind(row: MemberRow) {
        let store = InMemoryMemberStore::from_rows([
            row,
            MemberRow::new(100, 1, ContainerKind::Budget).with_containers([5]),
        ]);
        store
            .save_member(MemberRow::new(100, 1, ContainerKind::Category))
            .await
            .expect("save failed");

        let budget = store.snapshot(100, ContainerKind::Budget).await.unwrap();
        let category = store.snapshot(100, ContainerKind::Category).await.unwrap();
        assert_eq!(budget.container_ids, BTreeSet::from([5]));
        assert!(category.container_ids.is_empty());
    }
}
