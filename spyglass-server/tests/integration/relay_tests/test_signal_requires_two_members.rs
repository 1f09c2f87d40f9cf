use serde_json::json;
use spyglass_core::{ConnectionId, ServerMessage};
use spyglass_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::{EVENT_TIMEOUT_MS, OutputEvent};

#[tokio::test]
async fn test_signal_requires_two_members() {
    init_tracing();

    let (cmd_tx, output) = create_test_room("r1");

    let a = ConnectionId::new();
    cmd_tx
        .send(RoomCommand::Join {
            conn: a,
            name: "alice".into(),
        })
        .await
        .expect("room alive");

    cmd_tx
        .send(RoomCommand::Signal {
            conn: a,
            payload: json!({"desc": "nobody-is-listening"}),
        })
        .await
        .expect("room alive");

    // the request behind the signal proves the signal was processed
    cmd_tx
        .send(RoomCommand::RequestScreen { conn: a })
        .await
        .expect("room alive");
    assert!(output.wait_for_messages(a, 2, EVENT_TIMEOUT_MS).await);

    assert!(
        !output.events().await.iter().any(|e| matches!(
            e,
            OutputEvent::Delivered {
                msg: ServerMessage::Signal(_),
                ..
            }
        )),
        "a signal with no peer present must be dropped"
    );
}
