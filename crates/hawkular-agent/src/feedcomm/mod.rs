//! Feed communication: the bridge between gateway frames and commands.
//!
//! A [`FeedCommProcessor`] decodes one inbound frame, looks the request up in
//! its [`CommandRegistry`], runs the command and encodes the reply. Requests
//! the agent does not know, undecodable frames and panicking commands all
//! produce a `GenericErrorResponse`.
//!
//! After a reply is written, every [`ResponseListener`] passed for that
//! invocation learns whether the send succeeded.

mod processor;
mod registry;

use std::io;

pub use processor::{Exchange, FeedCommProcessor, UNKNOWN_REQUEST};
pub use registry::CommandRegistry;

pub(crate) const FEEDCOMM_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::feedcomm");

/// Observer of replies leaving the agent.
pub trait ResponseListener: Send + Sync {
    /// Called once the reply of `exchange` was written, or failed to be.
    fn on_response(&self, exchange: &Exchange, outcome: Result<(), &io::Error>);
}
