use crate::relay::RelayOutput;
use crate::room::handshake::{CancelOutcome, HandshakeState};
use crate::room::room_command::RoomCommand;
use serde_json::Value;
use spyglass_core::{ConnectionId, ControlEvent, PeerInfo, Role, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Maximum number of principals in a room.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Clone)]
struct Member {
    conn: ConnectionId,
    name: String,
}

/// One coordination unit: up to two members, at most one pending permission
/// request, at most one active sharer. All state transitions for a room go
/// through its single event loop, which serializes them without any lock
/// shared across rooms.
pub struct Room {
    id: RoomId,
    members: Vec<Member>,
    sharer: Option<ConnectionId>,
    handshake: HandshakeState,
    command_rx: mpsc::Receiver<RoomCommand>,
    output: Arc<dyn RelayOutput>,
}

impl Room {
    pub fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        output: Arc<dyn RelayOutput>,
    ) -> Self {
        Self {
            id,
            members: Vec::new(),
            sharer: None,
            handshake: HandshakeState::default(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Room '{}' event loop started", self.id);

        let mut saw_member = false;
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;

            if saw_member && self.members.is_empty() {
                break;
            }
            saw_member |= !self.members.is_empty();
        }

        info!("Room '{}' event loop finished", self.id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { conn, name } => self.handle_join(conn, name).await,

            // explicit leave and transport disconnect converge on the same
            // path so peers never observe a ghost sharer
            RoomCommand::Leave { conn } | RoomCommand::Disconnect { conn } => {
                self.remove_member(conn).await;
            }

            RoomCommand::RequestScreen { conn } => self.handle_request_screen(conn).await,

            RoomCommand::PermissionResponse { conn, accepted } => {
                self.handle_permission_response(conn, accepted).await;
            }

            RoomCommand::Signal { conn, payload } => self.relay_signal(conn, payload).await,

            RoomCommand::Control { conn, event } => self.relay_control(conn, event).await,

            RoomCommand::StopShare { conn } => self.handle_stop_share(conn).await,
        }
    }

    async fn handle_join(&mut self, conn: ConnectionId, name: String) {
        if self.member_index(conn).is_some() {
            debug!("Room '{}': {} joined twice, ignoring", self.id, conn);
            return;
        }

        if self.members.len() >= ROOM_CAPACITY {
            info!("Room '{}' is full, rejecting {}", self.id, conn);
            self.output.deliver(conn, ServerMessage::RoomFull).await;
            self.output.bind_room(conn, None).await;
            return;
        }

        info!("Room '{}': {} ('{}') joined", self.id, conn, name);

        for member in &self.members {
            self.output
                .deliver(member.conn, ServerMessage::PeerJoined)
                .await;
        }

        self.members.push(Member { conn, name });
        self.broadcast_peer_list().await;
    }

    async fn remove_member(&mut self, conn: ConnectionId) {
        let Some(pos) = self.member_index(conn) else {
            debug!("Room '{}': removal of non-member {}, ignoring", self.id, conn);
            return;
        };

        // a departing sharer stops the share first, so the remaining peer
        // sees the same stop-share -> peer-left sequence on every exit path
        if self.sharer == Some(conn) {
            self.stop_share(conn).await;
        }

        match self.handshake.cancel_for(conn) {
            CancelOutcome::TargetLeft { requester } => {
                self.output
                    .deliver(requester, ServerMessage::PermissionResult(false))
                    .await;
            }
            CancelOutcome::RequesterLeft | CancelOutcome::NotPending => {}
        }

        let member = self.members.remove(pos);
        info!("Room '{}': {} ('{}') left", self.id, member.conn, member.name);

        self.output.bind_room(conn, None).await;
        self.output.set_role(conn, Role::Unassigned).await;

        for remaining in &self.members {
            self.output
                .deliver(remaining.conn, ServerMessage::PeerLeft)
                .await;
        }
        self.broadcast_peer_list().await;
    }

    async fn handle_request_screen(&mut self, conn: ConnectionId) {
        if self.member_index(conn).is_none() {
            debug!("Room '{}': screen request from non-member {}", self.id, conn);
            return;
        }

        if self.members.len() < ROOM_CAPACITY {
            // a request with no peer present is answered, not silently
            // dropped
            self.output
                .deliver(
                    conn,
                    ServerMessage::Error {
                        code: "no-peer".into(),
                        message: "no peer present in the room".into(),
                    },
                )
                .await;
            return;
        }

        let Some(target) = self.peer_of(conn) else {
            return;
        };

        if let Some(old) = self.handshake.begin(conn, target) {
            warn!(
                "Room '{}': request from {} supersedes one pending for {:?}, denying the old requester",
                self.id,
                conn,
                old.since.elapsed()
            );
            self.output
                .deliver(old.requester, ServerMessage::PermissionResult(false))
                .await;
        }

        let name = self.member_name(conn).unwrap_or_default();
        self.output
            .deliver(target, ServerMessage::ScreenRequest { from: conn, name })
            .await;
    }

    async fn handle_permission_response(&mut self, conn: ConnectionId, accepted: bool) {
        if self.member_index(conn).is_none() {
            debug!(
                "Room '{}': permission response from non-member {}",
                self.id, conn
            );
            return;
        }

        // a response with nothing pending, or from the wrong side of the
        // handshake, is a stale UI race
        let Some(requester) = self.handshake.respond(conn) else {
            debug!(
                "Room '{}': ignoring permission response from {}",
                self.id, conn
            );
            return;
        };

        self.output
            .deliver(requester, ServerMessage::PermissionResult(accepted))
            .await;

        if accepted {
            info!(
                "Room '{}': {} granted screen access to {}",
                self.id, conn, requester
            );
            self.sharer = Some(conn);
            self.output.set_role(conn, Role::Sharer).await;
            self.output.set_role(requester, Role::Viewer).await;
        } else {
            info!(
                "Room '{}': {} denied screen access to {}",
                self.id, conn, requester
            );
        }
    }

    async fn relay_signal(&self, conn: ConnectionId, payload: Value) {
        if self.members.len() != ROOM_CAPACITY || self.member_index(conn).is_none() {
            // negotiation cannot proceed without both parties present; the
            // sender's own renegotiation logic re-sends once a peer arrives
            debug!("Room '{}': dropping signal from {}", self.id, conn);
            return;
        }

        let Some(peer) = self.peer_of(conn) else {
            return;
        };
        self.output.deliver(peer, ServerMessage::Signal(payload)).await;
    }

    async fn relay_control(&self, conn: ConnectionId, event: ControlEvent) {
        let Some(sharer) = self.sharer else {
            debug!(
                "Room '{}': control event with no active sharer, dropping",
                self.id
            );
            return;
        };

        // late events after a stop, or events from the sharer's own side,
        // must not reanimate a stale session
        if conn == sharer || self.member_index(conn).is_none() {
            debug!(
                "Room '{}': control event from {} outside the viewer role, dropping",
                self.id, conn
            );
            return;
        }

        self.output.deliver(sharer, ServerMessage::Control(event)).await;
    }

    async fn handle_stop_share(&mut self, conn: ConnectionId) {
        if self.member_index(conn).is_none() {
            debug!("Room '{}': stop-share from non-member {}", self.id, conn);
            return;
        }
        self.stop_share(conn).await;
    }

    /// Clear the active share. Idempotent: with no sharer designated this
    /// does nothing, so a repeated stop produces no second notification.
    async fn stop_share(&mut self, initiator: ConnectionId) {
        let Some(sharer) = self.sharer.take() else {
            return;
        };

        let name = self.member_name(initiator).unwrap_or_default();
        info!(
            "Room '{}': '{}' stopped the share (sharer was {})",
            self.id, name, sharer
        );

        for member in &self.members {
            self.output.set_role(member.conn, Role::Unassigned).await;
        }

        for member in &self.members {
            if member.conn != initiator {
                self.output
                    .deliver(
                        member.conn,
                        ServerMessage::StopShare {
                            room_id: self.id.clone(),
                            name: name.clone(),
                        },
                    )
                    .await;
            }
        }
    }

    async fn broadcast_peer_list(&self) {
        let peers: Vec<PeerInfo> = self
            .members
            .iter()
            .map(|m| PeerInfo {
                id: m.conn,
                name: m.name.clone(),
                room_id: self.id.clone(),
                is_online: true,
            })
            .collect();

        for member in &self.members {
            self.output
                .deliver(member.conn, ServerMessage::PeerList(peers.clone()))
                .await;
        }
    }

    fn member_index(&self, conn: ConnectionId) -> Option<usize> {
        self.members.iter().position(|m| m.conn == conn)
    }

    fn member_name(&self, conn: ConnectionId) -> Option<String> {
        self.members
            .iter()
            .find(|m| m.conn == conn)
            .map(|m| m.name.clone())
    }

    /// The one member whose id differs from `conn`.
    fn peer_of(&self, conn: ConnectionId) -> Option<ConnectionId> {
        self.members
            .iter()
            .map(|m| m.conn)
            .find(|&other| other != conn)
    }
}
