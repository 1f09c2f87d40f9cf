use spyglass_core::ServerMessage;
use spyglass_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing, join_pair};
use crate::utils::EVENT_TIMEOUT_MS;

#[tokio::test]
async fn test_supersede_pending_request() {
    init_tracing();

    let (cmd_tx, output) = create_test_room("r1");
    let (a, b) = join_pair(&cmd_tx, &output).await;

    // the requester asks twice before the target answers
    cmd_tx
        .send(RoomCommand::RequestScreen { conn: a })
        .await
        .expect("room alive");
    cmd_tx
        .send(RoomCommand::RequestScreen { conn: a })
        .await
        .expect("room alive");

    // the first request dies with an implicit denial
    assert!(
        output
            .wait_for_message(a, &ServerMessage::PermissionResult(false), EVENT_TIMEOUT_MS)
            .await
    );

    // the target saw both prompts; only the second is live
    let prompts: Vec<_> = output
        .messages_for(b)
        .await
        .into_iter()
        .filter(|m| matches!(m, ServerMessage::ScreenRequest { .. }))
        .collect();
    assert_eq!(prompts.len(), 2);

    cmd_tx
        .send(RoomCommand::PermissionResponse {
            conn: b,
            accepted: true,
        })
        .await
        .expect("room alive");

    assert!(
        output
            .wait_for_message(a, &ServerMessage::PermissionResult(true), EVENT_TIMEOUT_MS)
            .await
    );

    // denial of the superseded request, then the grant of the live one
    let results: Vec<_> = output
        .messages_for(a)
        .await
        .into_iter()
        .filter(|m| matches!(m, ServerMessage::PermissionResult(_)))
        .collect();
    assert_eq!(
        results,
        vec![
            ServerMessage::PermissionResult(false),
            ServerMessage::PermissionResult(true),
        ]
    );
}
