use spyglass_core::{ConnectionId, RoomId};
use spyglass_server::{RoomCommand, RoomManager};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{EVENT_TIMEOUT_MS, MockRelayOutput};

#[tokio::test]
async fn test_room_recreated_after_empty() {
    init_tracing();

    let output = MockRelayOutput::new();
    let manager = RoomManager::new(Arc::new(output.clone()));
    let room_id = RoomId::from("r1");

    let tx = manager.get_or_create(&room_id);
    let a = ConnectionId::new();
    tx.send(RoomCommand::Join {
        conn: a,
        name: "alice".into(),
    })
    .await
    .expect("room alive");
    tx.send(RoomCommand::Leave { conn: a })
        .await
        .expect("room alive");

    // the actor exits once its last member is gone
    let start = std::time::Instant::now();
    while !tx.is_closed() {
        assert!(
            start.elapsed().as_millis() < u128::from(EVENT_TIMEOUT_MS),
            "room actor did not shut down"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    // the same room id is usable again through a fresh incarnation
    let tx2 = manager.get_or_create(&room_id);
    let b = ConnectionId::new();
    tx2.send(RoomCommand::Join {
        conn: b,
        name: "bob".into(),
    })
    .await
    .expect("recreated room alive");

    assert!(output.wait_for_messages(b, 1, EVENT_TIMEOUT_MS).await);
}
