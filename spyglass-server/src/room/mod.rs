mod handshake;
mod room;
mod room_command;
mod room_manager;

pub use handshake::*;
pub use room::*;
pub use room_command::*;
pub use room_manager::*;
