use spyglass_core::{ConnectionId, ServerMessage};
use spyglass_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing, join_pair};
use crate::utils::{EVENT_TIMEOUT_MS, OutputEvent};

#[tokio::test]
async fn test_third_member_rejected() {
    init_tracing();

    let (cmd_tx, output) = create_test_room("r1");
    let (_a, _b) = join_pair(&cmd_tx, &output).await;

    let c = ConnectionId::new();
    cmd_tx
        .send(RoomCommand::Join {
            conn: c,
            name: "carol".into(),
        })
        .await
        .expect("room alive");

    assert!(output.wait_for_messages(c, 1, EVENT_TIMEOUT_MS).await);
    assert_eq!(output.messages_for(c).await, vec![ServerMessage::RoomFull]);

    // the rejected connection is unbound, not left half-joined
    assert!(
        output
            .events()
            .await
            .contains(&OutputEvent::RoomBound { conn: c, room: None })
    );

    // no roster observed by anyone ever exceeds two members
    for event in output.events().await {
        if let OutputEvent::Delivered {
            msg: ServerMessage::PeerList(peers),
            ..
        } = event
        {
            assert!(peers.len() <= 2, "roster grew past capacity: {:?}", peers);
        }
    }
}
