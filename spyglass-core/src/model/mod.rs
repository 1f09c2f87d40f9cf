mod connection;
mod control;
mod protocol;
mod room;

pub use connection::{ConnectionId, Role};
pub use control::ControlEvent;
pub use protocol::{ClientMessage, PeerInfo, ServerMessage};
pub use room::RoomId;
