use spyglass_core::{ControlEvent, ServerMessage};
use spyglass_server::RoomCommand;

use crate::integration::{create_test_room, grant_share, init_tracing, join_pair};
use crate::utils::EVENT_TIMEOUT_MS;

#[tokio::test]
async fn test_control_routed_to_sharer() {
    init_tracing();

    let (cmd_tx, output) = create_test_room("r1");
    let (a, b) = join_pair(&cmd_tx, &output).await;
    grant_share(&cmd_tx, &output, a, b).await;

    let event = ControlEvent::MouseMove { x: 0.25, y: 0.75 };
    cmd_tx
        .send(RoomCommand::Control {
            conn: a,
            event: event.clone(),
        })
        .await
        .expect("room alive");

    assert!(
        output
            .wait_for_message(b, &ServerMessage::Control(event), EVENT_TIMEOUT_MS)
            .await
    );

    let key = ControlEvent::KeyDown {
        key: "Enter".into(),
    };
    cmd_tx
        .send(RoomCommand::Control {
            conn: a,
            event: key.clone(),
        })
        .await
        .expect("room alive");

    assert!(
        output
            .wait_for_message(b, &ServerMessage::Control(key), EVENT_TIMEOUT_MS)
            .await
    );
}
