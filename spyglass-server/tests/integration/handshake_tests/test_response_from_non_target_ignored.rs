use spyglass_core::{Role, ServerMessage};
use spyglass_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing, join_pair};
use crate::utils::EVENT_TIMEOUT_MS;

#[tokio::test]
async fn test_response_from_non_target_ignored() {
    init_tracing();

    let (cmd_tx, output) = create_test_room("r1");
    let (a, b) = join_pair(&cmd_tx, &output).await;

    cmd_tx
        .send(RoomCommand::RequestScreen { conn: a })
        .await
        .expect("room alive");

    // the requester cannot answer its own request
    cmd_tx
        .send(RoomCommand::PermissionResponse {
            conn: a,
            accepted: true,
        })
        .await
        .expect("room alive");

    // the designated target can
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

    let results: Vec<_> = output
        .messages_for(a)
        .await
        .into_iter()
        .filter(|m| matches!(m, ServerMessage::PermissionResult(_)))
        .collect();
    assert_eq!(results, vec![ServerMessage::PermissionResult(true)]);

    // the grant went to the real target, not the self-responder
    assert_eq!(output.role_of(b).await, Some(Role::Sharer));
    assert_eq!(output.role_of(a).await, Some(Role::Viewer));
}
