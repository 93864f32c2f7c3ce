// End to end in memory test for single-event member linking.
//
// Responsibilities
// - Repoint a member after its container is deleted and another one assigned.
// - Show that one failing event does not hold back the rest of the topic.

use association_sync::adapters::in_memory::in_memory_member_store::InMemoryMemberStore;
use association_sync::adapters::in_memory::in_memory_transport::InMemoryTransport;
use association_sync::application::consumer::runner::{BatchConsumer, PollOutcome};
use association_sync::application::linking::handler::MemberLinkHandler;
use association_sync::core::association::container::ContainerKind;
use association_sync::core::member_link::member_row::MemberRow;
use rstest::rstest;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const TOPIC: &str = "expense-budget-links";

fn record(container_id: i64, user_id: i64, member_id: i64, action: Option<&str>) -> String {
    json!({
        "userId": user_id,
        "containerId": container_id,
        "memberId": member_id,
        "action": action,
    })
    .to_string()
}

#[rstest]
#[tokio::test]
async fn member_references_follow_a_reassigned_container() {
    let transport = Arc::new(InMemoryTransport::new());
    let store = Arc::new(InMemoryMemberStore::from_rows([
        MemberRow::new(100, 1, ContainerKind::Budget).with_containers([5]),
        MemberRow::new(101, 1, ContainerKind::Budget).with_containers([5]),
    ]));
    store.fail_saves_for(100).await;
    let consumer = BatchConsumer::new(
        TOPIC,
        transport.clone(),
        Arc::new(MemberLinkHandler::new(ContainerKind::Budget, store.clone())),
        10,
        Duration::from_millis(5),
    );

    transport.publish(TOPIC, record(5, 1, 100, Some("REMOVE"))).await;
    transport.publish(TOPIC, record(5, 1, 101, Some("REMOVE"))).await;
    transport.publish(TOPIC, record(8, 1, 101, None)).await;

    let outcome = consumer.run_once().await.expect("transport failed");

    let report = match outcome {
        PollOutcome::Acknowledged(report) => report,
        other => panic!("expected the batch to be acknowledged, got {other:?}"),
    };
    assert_eq!(report.saved, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        store.snapshot(101, ContainerKind::Budget).await.unwrap().container_ids,
        BTreeSet::from([8])
    );
    assert_eq!(
        store.snapshot(100, ContainerKind::Budget).await.unwrap().container_ids,
        BTreeSet::from([5])
    );
    assert_eq!(transport.acked_count().await, 1);
}
