use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::connection::ConnectionId;
use crate::model::control::ControlEvent;
use crate::model::room::RoomId;

/// Messages a client sends over its relay channel.
///
/// `from` and `to` fields are advisory: the relay trusts only the
/// connection's own identity and the room's handshake state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    SetName {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    RequestScreen {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ConnectionId>,
    },
    PermissionResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<ConnectionId>,
        accepted: bool,
    },
    Signal(Value),
    Control(ControlEvent),
    #[serde(rename_all = "camelCase")]
    StopShare {
        room_id: RoomId,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    LeaveRoom {
        room_id: RoomId,
        name: String,
    },
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    Welcome {
        id: ConnectionId,
    },
    RoomFull,
    PeerJoined,
    PeerLeft,
    ScreenRequest {
        from: ConnectionId,
        name: String,
    },
    PermissionResult(bool),
    Signal(Value),
    Control(ControlEvent),
    #[serde(rename_all = "camelCase")]
    StopShare {
        room_id: RoomId,
        name: String,
    },
    PeerList(Vec<PeerInfo>),
    Error {
        code: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub id: ConnectionId,
    pub name: String,
    pub room_id: RoomId,
    pub is_online: bool,
}
