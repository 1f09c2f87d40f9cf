use crate::relay::RelayOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use spyglass_core::{ConnectionId, PeerInfo, Role, RoomId, ServerMessage};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{error, warn};

struct ConnectionEntry {
    name: String,
    room: Option<RoomId>,
    role: Role,
    join_seq: u64,
    tx: mpsc::UnboundedSender<Message>,
}

struct RegistryInner {
    connections: DashMap<ConnectionId, ConnectionEntry>,
    join_counter: AtomicU64,
}

/// Process-wide registry of live connections and their outbound channels.
/// Rooms reference members by id only; the entry here is the single owner
/// of a connection's attributes.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                connections: DashMap::new(),
                join_counter: AtomicU64::new(0),
            }),
        }
    }

    /// Allocate an id for a new transport connection. Ids are never reused.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> ConnectionId {
        let id = ConnectionId::new();
        self.inner.connections.insert(
            id,
            ConnectionEntry {
                name: String::new(),
                room: None,
                role: Role::Unassigned,
                join_seq: 0,
                tx,
            },
        );
        id
    }

    /// Unknown ids are a stale-client race, not an error.
    pub fn set_name(&self, id: ConnectionId, name: String) {
        if let Some(mut entry) = self.inner.connections.get_mut(&id) {
            entry.name = name;
        }
    }

    pub fn room_of(&self, id: ConnectionId) -> Option<RoomId> {
        self.inner.connections.get(&id).and_then(|e| e.room.clone())
    }

    pub fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.inner.connections.get(&id).map(|e| e.role)
    }

    pub fn remove(&self, id: ConnectionId) {
        self.inner.connections.remove(&id);
    }

    /// Snapshot of a room's members, ordered by when they joined it.
    pub fn list_members(&self, room_id: &RoomId) -> Vec<PeerInfo> {
        let mut members: Vec<(u64, PeerInfo)> = self
            .inner
            .connections
            .iter()
            .filter(|entry| entry.value().room.as_ref() == Some(room_id))
            .map(|entry| {
                (
                    entry.value().join_seq,
                    PeerInfo {
                        id: *entry.key(),
                        name: entry.value().name.clone(),
                        room_id: room_id.clone(),
                        is_online: true,
                    },
                )
            })
            .collect();

        members.sort_by_key(|(seq, _)| *seq);
        members.into_iter().map(|(_, info)| info).collect()
    }

    /// Serialize and queue a message onto the connection's outbound channel.
    /// Fire-and-forget: an unreachable peer is logged, never awaited.
    pub fn send(&self, id: ConnectionId, msg: &ServerMessage) {
        if let Some(entry) = self.inner.connections.get(&id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = entry.tx.send(Message::Text(json.into())) {
                        error!("Failed to queue message for {}: {:?}", id, e);
                    }
                }
                Err(e) => error!("Failed to serialize server message: {}", e),
            }
        } else {
            warn!("Attempted to send to disconnected connection {}", id);
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayOutput for ConnectionRegistry {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        self.send(to, &msg);
    }

    async fn bind_room(&self, conn: ConnectionId, room: Option<RoomId>) {
        if let Some(mut entry) = self.inner.connections.get_mut(&conn) {
            if room.is_some() {
                entry.join_seq = self.inner.join_counter.fetch_add(1, Ordering::Relaxed) + 1;
            }
            entry.room = room;
        }
    }

    async fn set_role(&self, conn: ConnectionId, role: Role) {
        if let Some(mut entry) = self.inner.connections.get_mut(&conn) {
            entry.role = role;
        }
    }
}
