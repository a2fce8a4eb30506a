//! Socket listener for the local command gateway.
//!
//! The listener binds the configured endpoint and accepts connections on a
//! background thread. Each connection carries one request frame and gets at
//! most one response frame back.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::GatewayConnectionHandler;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub use self::listener::ListenerHandle;
pub(crate) use self::listener::SocketListener;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
