//! Command execution for requests arriving over the command gateway.
//!
//! A command is bound to one request/response message pair and never fails
//! outward: every error becomes an `ERROR` response whose message names the
//! operation, the entity, the resource path and the time the request was
//! accepted.
//!
//! ## Layers
//!
//! - [`DmrResourcePathCommand`] wraps a [`DmrOperation`]. It resolves the
//!   managed server from the resource id, applies the locality and
//!   immutability policies, holds a DMR session for the whole operation and
//!   shapes the response.
//! - [`JmxResourcePathCommand`] does the same for a [`JmxOperation`] but
//!   leaves session handling to the operation.
//! - [`AgnosticCommand`] probes the DMR registry, then the JMX registry, and
//!   hands the request to the matching delegate.
//!
//! Concrete commands live in [`commands`].

mod agnostic;
pub mod commands;
mod context;
mod dmr;
mod error;
mod jmx;
mod response;
mod retry;
mod timestamp;

pub use agnostic::{AgnosticCommand, ProtocolDelegate};
pub use context::CommandContext;
pub use dmr::{DmrCall, DmrOperation, DmrResourcePathCommand};
pub use error::CommandError;
pub use jmx::{JmxCall, JmxOperation, JmxResourcePathCommand};
pub use retry::RetryPolicy;
pub use timestamp::EntryTimestamp;

pub(crate) use error::require;
pub(crate) use response::{Invocation, error_chain, refresh_indicator};

use hawkular_cmdgw_api::{ApiMessage, CodecError, MessageEnvelope, RawMessage};

/// Tracing target for command execution.
pub(crate) const CMD_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cmd");

/// A unit of work answering one request type.
pub trait Command: Send + Sync {
    /// Request handled by the command.
    type Request: ApiMessage;
    /// Response produced by the command.
    type Response: ApiMessage;

    /// Whether a successful run changes the managed server's inventory.
    const CHANGES_INVENTORY: bool = true;

    /// Runs the command. `None` means the request needs no reply.
    fn execute(
        &self,
        envelope: MessageEnvelope<Self::Request>,
        context: &CommandContext<'_>,
    ) -> Option<MessageEnvelope<Self::Response>>;
}

/// A command with its message types erased, as stored in the registry.
pub trait DynCommand: Send + Sync {
    /// Name of the request the command answers.
    fn request_name(&self) -> &'static str;

    /// Whether a successful run changes the managed server's inventory.
    fn changes_inventory(&self) -> bool;

    /// Decodes `request`, runs the command and encodes the reply.
    ///
    /// # Errors
    ///
    /// Fails only when the request body does not match the request type or
    /// the reply cannot be serialised.
    fn run(
        &self,
        request: RawMessage,
        context: &CommandContext<'_>,
    ) -> Result<Option<RawMessage>, CodecError>;
}

impl<C: Command> DynCommand for C {
    fn request_name(&self) -> &'static str {
        C::Request::NAME
    }

    fn changes_inventory(&self) -> bool {
        C::CHANGES_INVENTORY
    }

    fn run(
        &self,
        request: RawMessage,
        context: &CommandContext<'_>,
    ) -> Result<Option<RawMessage>, CodecError> {
        let envelope = request.into_envelope::<C::Request>()?;
        self.execute(envelope, context)
            .map(RawMessage::from_envelope)
            .transpose()
    }
}

#[cfg(test)]
pub(crate) mod test_support;
