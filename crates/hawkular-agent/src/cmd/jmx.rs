//! Base behaviour shared by JMX-backed commands.
//!
//! Unlike the DMR base no session is held for the whole command. The
//! operation opens one through [`JmxCall::open_session`] when it actually
//! talks to the MBean server.

use hawkular_cmdgw_api::{MessageEnvelope, ResourceRequest, ResourceResponse, ResourceResponseFields};

use super::context::CommandContext;
use super::error::CommandError;
use super::response::Invocation;
use super::Command;
use crate::id::{ResourceIdParts, resolve_resource_id};
use crate::protocol::{JmxEndpointService, JmxSession, SessionGuard};

/// What a JMX operation works with once the endpoint is resolved.
pub struct JmxCall<'a> {
    /// The endpoint service owning the resource.
    pub service: &'a JmxEndpointService,
    /// Resolved resource id, `<feed>~<server>~<object-name>`.
    pub resource_id: &'a str,
    /// The resource path exactly as the caller sent it.
    pub resource_path: &'a str,
    /// Object-name part of the id.
    pub object_name: &'a str,
    /// The invocation context.
    pub context: &'a CommandContext<'a>,
}

impl JmxCall<'_> {
    /// Opens a session that closes when the guard drops.
    pub fn open_session(&self) -> Result<SessionGuard<JmxSession>, CommandError> {
        Ok(SessionGuard::new(self.service.open_session()?))
    }
}

/// The part of a JMX command that differs between commands.
pub trait JmxOperation: Send + Sync {
    /// Request handled.
    type Request: ResourceRequest;
    /// Response produced.
    type Response: ResourceResponse;

    /// Operation name used in messages.
    const OPERATION: &'static str;
    /// Entity name used in messages.
    const ENTITY: &'static str;

    /// Operation name for `request`.
    fn operation_name(&self, _request: &Self::Request) -> String {
        Self::OPERATION.to_owned()
    }

    /// Whether the command changes the managed server.
    fn modifies_resource(&self) -> bool {
        true
    }

    /// Performs the operation; see [`super::DmrOperation::execute`].
    fn execute(
        &self,
        call: &JmxCall<'_>,
        envelope: MessageEnvelope<Self::Request>,
        response: &mut Self::Response,
    ) -> Result<Option<Vec<u8>>, CommandError>;
}

/// Runs a [`JmxOperation`] with endpoint resolution, the immutability check
/// and response shaping.
#[derive(Debug, Default, Clone, Copy)]
pub struct JmxResourcePathCommand<H> {
    operation: H,
}

impl<H: JmxOperation> JmxResourcePathCommand<H> {
    /// Wraps `operation`.
    pub const fn new(operation: H) -> Self {
        Self { operation }
    }

    fn run(
        &self,
        invocation: &Invocation,
        envelope: MessageEnvelope<H::Request>,
        context: &CommandContext<'_>,
        response: &mut H::Response,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let raw = envelope
            .basic_message
            .resource_id()
            .ok_or(CommandError::missing_resource_id(H::ENTITY))?;
        let resource_id = resolve_resource_id(raw)?;
        let parts = ResourceIdParts::parse(&resource_id)?;

        let engine = context.engine();
        let service = engine
            .protocols()
            .jmx()
            .get(parts.managed_server_name())
            .ok_or_else(|| {
                CommandError::unknown_managed_server(
                    invocation.operation(),
                    H::ENTITY,
                    invocation.raw_path(),
                    parts.managed_server_name(),
                )
            })?;
        if self.operation.modifies_resource() && engine.is_immutable() {
            return Err(CommandError::Immutable);
        }

        let call = JmxCall {
            service: &*service,
            resource_id: &resource_id,
            resource_path: invocation.raw_path(),
            object_name: parts.id_part(),
            context,
        };
        self.operation.execute(&call, envelope, response)
    }
}

impl<H: JmxOperation> Command for JmxResourcePathCommand<H> {
    type Request = H::Request;
    type Response = H::Response;

    fn execute(
        &self,
        envelope: MessageEnvelope<H::Request>,
        context: &CommandContext<'_>,
    ) -> Option<MessageEnvelope<H::Response>> {
        let request = &envelope.basic_message;
        let invocation = Invocation::start(
            self.operation.operation_name(request),
            H::ENTITY,
            request.resource_id(),
        );
        let mut response = H::Response::default();
        *response.resource_mut() = ResourceResponseFields::answering(request.resource());

        let binary_data = match self.run(&invocation, envelope, context, &mut response) {
            Ok(binary_data) => {
                invocation.succeed(&mut response);
                binary_data
            }
            Err(error) => {
                invocation.fail(&mut response, &error);
                None
            }
        };
        Some(MessageEnvelope {
            basic_message: response,
            binary_data,
        })
    }
}
