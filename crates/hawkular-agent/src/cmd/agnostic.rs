//! Dispatch of protocol-agnostic requests to a DMR or JMX delegate.

use hawkular_cmdgw_api::{MessageEnvelope, ResourceRequest, ResourceResponse, ResourceResponseFields};
use tracing::debug;

use super::context::CommandContext;
use super::error::CommandError;
use super::response::Invocation;
use super::timestamp::EntryTimestamp;
use super::{CMD_TARGET, Command};
use crate::id::{ResourceIdParts, resolve_resource_id};

/// The delegate chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolDelegate {
    /// The managed server is registered for DMR.
    Dmr,
    /// The managed server is registered for JMX.
    Jmx,
}

/// Routes a request to the DMR or JMX implementation of the same command.
///
/// DMR wins when a server name is registered for both protocols. Nothing is
/// executed before the choice is made; each delegate repeats its own
/// validation.
pub struct AgnosticCommand<D: Command, J> {
    entity: &'static str,
    operation_name: fn(&D::Request) -> String,
    dmr: D,
    jmx: J,
}

impl<D, J> AgnosticCommand<D, J>
where
    D: Command,
    D::Request: ResourceRequest,
    D::Response: ResourceResponse,
    J: Command<Request = D::Request, Response = D::Response>,
{
    /// Dispatches between `dmr` and `jmx`, naming failures with `entity` and
    /// the operation name derived from the request.
    pub const fn new(
        entity: &'static str,
        operation_name: fn(&D::Request) -> String,
        dmr: D,
        jmx: J,
    ) -> Self {
        Self {
            entity,
            operation_name,
            dmr,
            jmx,
        }
    }

    /// Picks the delegate for `request`.
    ///
    /// # Errors
    ///
    /// Fails when the resource id is missing or malformed, or when neither
    /// registry knows the managed server.
    pub fn select(
        &self,
        request: &D::Request,
        context: &CommandContext<'_>,
    ) -> Result<ProtocolDelegate, CommandError> {
        let raw = request
            .resource_id()
            .ok_or(CommandError::missing_resource_id(self.entity))?;
        let resource_id = resolve_resource_id(raw)?;
        let parts = ResourceIdParts::parse(&resource_id)?;
        let server = parts.managed_server_name();
        let protocols = context.engine().protocols();
        if protocols.dmr().contains(server) {
            Ok(ProtocolDelegate::Dmr)
        } else if protocols.jmx().contains(server) {
            Ok(ProtocolDelegate::Jmx)
        } else {
            Err(CommandError::unknown_managed_server(
                (self.operation_name)(request),
                self.entity,
                raw,
                server,
            ))
        }
    }
}

impl<D, J> Command for AgnosticCommand<D, J>
where
    D: Command,
    D::Request: ResourceRequest,
    D::Response: ResourceResponse,
    J: Command<Request = D::Request, Response = D::Response>,
{
    type Request = D::Request;
    type Response = D::Response;

    const CHANGES_INVENTORY: bool = D::CHANGES_INVENTORY || J::CHANGES_INVENTORY;

    fn execute(
        &self,
        envelope: MessageEnvelope<D::Request>,
        context: &CommandContext<'_>,
    ) -> Option<MessageEnvelope<D::Response>> {
        let requested_at = EntryTimestamp::now();
        match self.select(&envelope.basic_message, context) {
            Ok(ProtocolDelegate::Dmr) => {
                debug!(target: CMD_TARGET, delegate = "dmr", "dispatching agnostic command");
                self.dmr.execute(envelope, context)
            }
            Ok(ProtocolDelegate::Jmx) => {
                debug!(target: CMD_TARGET, delegate = "jmx", "dispatching agnostic command");
                self.jmx.execute(envelope, context)
            }
            Err(error) => {
                let request = &envelope.basic_message;
                let invocation = Invocation::new(
                    (self.operation_name)(request),
                    self.entity,
                    request.resource_id(),
                    requested_at,
                );
                let mut response = D::Response::default();
                *response.resource_mut() = ResourceResponseFields::answering(request.resource());
                invocation.fail(&mut response, &error);
                Some(MessageEnvelope::new(response))
            }
        }
    }
}
