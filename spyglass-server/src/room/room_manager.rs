use crate::relay::RelayOutput;
use crate::room::{Room, RoomCommand};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use spyglass_core::RoomId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Lazily creates rooms on first join and prunes their table entries once
/// their event loops finish. There is no global lock across rooms.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    output: Arc<dyn RelayOutput>,
}

impl RoomManager {
    pub fn new(output: Arc<dyn RelayOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            output,
        }
    }

    /// Sender for the room, creating its actor on first use. A sender left
    /// behind by an already-finished actor is replaced in place.
    pub fn get_or_create(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_closed() {
                    return occupied.get().clone();
                }
                let tx = self.spawn_room(room_id);
                occupied.insert(tx.clone());
                tx
            }
            Entry::Vacant(vacant) => {
                let tx = self.spawn_room(room_id);
                vacant.insert(tx.clone());
                tx
            }
        }
    }

    /// Sender for an existing live room; `None` for rooms that were never
    /// created or have already shut down.
    pub fn sender_for(&self, room_id: &RoomId) -> Option<mpsc::Sender<RoomCommand>> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.value().clone())
            .filter(|sender| !sender.is_closed())
    }

    fn spawn_room(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        info!("Creating new room: {}", room_id);

        let (tx, rx) = mpsc::channel(100);
        let room = Room::new(room_id.clone(), rx, Arc::clone(&self.output));

        let rooms = Arc::clone(&self.rooms);
        let key = room_id.clone();
        tokio::spawn(async move {
            room.run().await;
            // drop the table entry once the actor is gone, unless the slot
            // was already reused by a newer incarnation of the room
            rooms.remove_if(&key, |_, sender| sender.is_closed());
        });

        tx
    }
}
