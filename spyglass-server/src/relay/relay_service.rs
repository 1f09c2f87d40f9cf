use crate::registry::ConnectionRegistry;
use crate::relay::RelayOutput;
use crate::room::{RoomCommand, RoomManager};
use axum::extract::ws::Message;
use spyglass_core::{ConnectionId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Shared state handed to the transport layer: the connection registry plus
/// the room table. Cloning is cheap; both halves are `Arc`-backed.
#[derive(Clone)]
pub struct RelayService {
    registry: ConnectionRegistry,
    rooms: RoomManager,
}

impl RelayService {
    pub fn new() -> Self {
        let registry = ConnectionRegistry::new();
        let rooms = RoomManager::new(Arc::new(registry.clone()));
        Self { registry, rooms }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> ConnectionId {
        self.registry.register(tx)
    }

    pub fn set_name(&self, conn: ConnectionId, name: String) {
        self.registry.set_name(conn, name);
    }

    /// Route a join attempt into the room, creating it on first use.
    /// Returns the room's command sender for the connection's later traffic,
    /// or `None` when the attempt was not routed at all.
    pub async fn join(
        &self,
        conn: ConnectionId,
        room_id: RoomId,
        name: String,
    ) -> Option<mpsc::Sender<RoomCommand>> {
        if self.registry.room_of(conn).is_some() {
            warn!(
                "Connection {} tried to join '{}' while already in a room",
                conn, room_id
            );
            return None;
        }

        self.registry.set_name(conn, name.clone());

        // bind before the Join command is queued, so a disconnect racing
        // the join still routes cleanup into the room
        self.registry.bind_room(conn, Some(room_id.clone())).await;

        let mut cmd = RoomCommand::Join { conn, name };
        for _ in 0..2 {
            let tx = self.rooms.get_or_create(&room_id);
            match tx.send(cmd).await {
                Ok(()) => return Some(tx),
                // the room shut down between lookup and send; retry against
                // a fresh incarnation
                Err(err) => cmd = err.0,
            }
        }

        warn!("Could not route {} into room '{}'", conn, room_id);
        self.registry.bind_room(conn, None).await;
        None
    }

    /// Tear down a connection: route a disconnect into whatever room it was
    /// bound to, then drop the registry entry. Every transport exit funnels
    /// through here so silent disconnects converge with explicit leaves.
    pub async fn unregister(&self, conn: ConnectionId) {
        if let Some(room_id) = self.registry.room_of(conn) {
            if let Some(tx) = self.rooms.sender_for(&room_id) {
                let _ = tx.send(RoomCommand::Disconnect { conn }).await;
            }
        }
        self.registry.remove(conn);
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}
