use async_trait::async_trait;
use spyglass_core::{ConnectionId, Role, RoomId, ServerMessage};

/// Трейт, который должна реализовать внешняя система (реестр соединений),
/// чтобы комната могла доставлять события клиентам и обновлять их атрибуты.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    /// Доставить событие конкретному соединению.
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage);

    /// Привязать соединение к комнате (или отвязать, передав `None`).
    async fn bind_room(&self, conn: ConnectionId, room: Option<RoomId>);

    /// Обновить роль соединения в рамках сессии.
    async fn set_role(&self, conn: ConnectionId, role: Role);
}
