//! Connection lifecycle handlers.

mod connect;
mod disconnect;

pub use connect::ConnectHandler;
pub use disconnect::{DisconnectHandler, DisconnectResult};
