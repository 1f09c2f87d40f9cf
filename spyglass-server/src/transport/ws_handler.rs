use crate::relay::RelayService;
use crate::room::RoomCommand;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use spyglass_core::{ClientMessage, ConnectionId, RoomId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let conn_id = service.register(tx);
    info!("New WebSocket connection: {}", conn_id);

    // the client needs its server-assigned id to populate request fields
    service
        .registry()
        .send(conn_id, &ServerMessage::Welcome { id: conn_id });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            let mut joined: Option<(RoomId, mpsc::Sender<RoomCommand>)> = None;

            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            handle_client_message(client_msg, conn_id, &service, &mut joined).await;
                        }
                        Err(e) => warn!("Invalid message from {}: {:?}", conn_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.unregister(conn_id).await;
    info!("WebSocket disconnected: {}", conn_id);
}

async fn handle_client_message(
    msg: ClientMessage,
    conn_id: ConnectionId,
    service: &RelayService,
    joined: &mut Option<(RoomId, mpsc::Sender<RoomCommand>)>,
) {
    match msg {
        ClientMessage::SetName { name } => service.set_name(conn_id, name),

        ClientMessage::JoinRoom { room_id, name } => {
            if let Some(room_tx) = service.join(conn_id, room_id.clone(), name).await {
                *joined = Some((room_id, room_tx));
            }
        }

        ClientMessage::LeaveRoom { room_id, .. } => match joined.take() {
            Some((joined_id, room_tx)) if joined_id == room_id => {
                let _ = room_tx.send(RoomCommand::Leave { conn: conn_id }).await;
            }
            other => {
                debug!("Leave for '{}' from {} who is not in it", room_id, conn_id);
                *joined = other;
            }
        },

        // `from` on the wire is advisory; the connection's own identity is
        // what the room trusts
        ClientMessage::RequestScreen { room_id, .. } => {
            route(
                joined,
                Some(&room_id),
                conn_id,
                RoomCommand::RequestScreen { conn: conn_id },
            )
            .await;
        }

        ClientMessage::PermissionResponse { accepted, .. } => {
            route(
                joined,
                None,
                conn_id,
                RoomCommand::PermissionResponse {
                    conn: conn_id,
                    accepted,
                },
            )
            .await;
        }

        ClientMessage::Signal(payload) => {
            route(
                joined,
                None,
                conn_id,
                RoomCommand::Signal {
                    conn: conn_id,
                    payload,
                },
            )
            .await;
        }

        ClientMessage::Control(event) => {
            route(
                joined,
                None,
                conn_id,
                RoomCommand::Control {
                    conn: conn_id,
                    event,
                },
            )
            .await;
        }

        ClientMessage::StopShare { room_id, .. } => {
            route(
                joined,
                Some(&room_id),
                conn_id,
                RoomCommand::StopShare { conn: conn_id },
            )
            .await;
        }
    }
}

/// Forward a command into the connection's joined room. Commands sent
/// outside a room, or claiming a different room than the joined one, are
/// stale references and are dropped.
async fn route(
    joined: &Option<(RoomId, mpsc::Sender<RoomCommand>)>,
    claimed: Option<&RoomId>,
    conn_id: ConnectionId,
    cmd: RoomCommand,
) {
    let Some((room_id, room_tx)) = joined else {
        debug!("Dropping {:?} from {}: not in a room", cmd, conn_id);
        return;
    };

    if let Some(claimed) = claimed {
        if claimed != room_id {
            debug!(
                "Dropping {:?} from {}: claims room '{}' but joined '{}'",
                cmd, conn_id, claimed, room_id
            );
            return;
        }
    }

    let _ = room_tx.send(cmd).await;
}
