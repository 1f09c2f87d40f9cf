pub mod registry;
pub mod relay;
pub mod room;
pub mod transport;

pub use registry::*;
pub use relay::*;
pub use room::*;
pub use transport::*;
