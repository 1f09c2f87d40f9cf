mod relay_output;
mod relay_service;

pub use relay_output::*;
pub use relay_service::*;
