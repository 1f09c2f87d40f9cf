use serde_json::Value;
use spyglass_core::{ConnectionId, ControlEvent};

/// Команды, поступающие в комнату от транспортного слоя (WebSocket).
#[derive(Debug)]
pub enum RoomCommand {
    /// Подключение участника к комнате.
    Join { conn: ConnectionId, name: String },

    /// Явный выход участника из комнаты.
    Leave { conn: ConnectionId },

    /// Обрыв WebSocket соединения; обрабатывается как выход.
    Disconnect { conn: ConnectionId },

    /// Запрос доступа к экрану второго участника.
    RequestScreen { conn: ConnectionId },

    /// Ответ на запрос доступа к экрану.
    PermissionResponse { conn: ConnectionId, accepted: bool },

    /// Непрозрачный сигнальный пакет для второго участника.
    Signal { conn: ConnectionId, payload: Value },

    /// Событие ввода от зрителя к владельцу экрана.
    Control {
        conn: ConnectionId,
        event: ControlEvent,
    },

    /// Остановка трансляции экрана.
    StopShare { conn: ConnectionId },
}
