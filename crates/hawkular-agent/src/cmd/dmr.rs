//! Base behaviour shared by every DMR-backed command.

use hawkular_cmdgw_api::{MessageEnvelope, ResourceRequest, ResourceResponse, ResourceResponseFields};
use hawkular_dmr_client::ModelControllerClient;

use super::context::CommandContext;
use super::error::CommandError;
use super::response::Invocation;
use super::Command;
use crate::id::{ResourceIdParts, resolve_resource_id};
use crate::protocol::{DmrEndpointService, MonitoredEndpoint, SessionGuard};

/// What a DMR operation works with once the endpoint is resolved.
pub struct DmrCall<'a> {
    /// Open controller client; closed by the base after the operation.
    pub client: &'a dyn ModelControllerClient,
    /// The endpoint service owning the resource.
    pub service: &'a DmrEndpointService,
    /// Resolved resource id, `<feed>~<server>~<path>`.
    pub resource_id: &'a str,
    /// The resource path exactly as the caller sent it.
    pub resource_path: &'a str,
    /// Management-model path of the resource, for example
    /// `/subsystem=datasources/data-source=ExampleDS`.
    pub model_node_path: &'a str,
    /// The invocation context.
    pub context: &'a CommandContext<'a>,
}

/// The part of a DMR command that differs between commands.
pub trait DmrOperation: Send + Sync {
    /// Request handled.
    type Request: ResourceRequest;
    /// Response produced.
    type Response: ResourceResponse;

    /// Operation name used in messages, for example `Add`.
    const OPERATION: &'static str;
    /// Entity name used in messages, for example `Datasource`.
    const ENTITY: &'static str;

    /// Operation name for `request`; most commands use [`Self::OPERATION`].
    fn operation_name(&self, _request: &Self::Request) -> String {
        Self::OPERATION.to_owned()
    }

    /// Whether the command changes the managed server.
    fn modifies_resource(&self) -> bool {
        true
    }

    /// Checks the model-node path before any endpoint is resolved.
    fn validate_path(&self, _model_node_path: &str, _request: &Self::Request) -> Result<(), CommandError> {
        Ok(())
    }

    /// Checks the resolved endpoint before the immutability check.
    fn validate_endpoint(
        &self,
        _endpoint: &MonitoredEndpoint,
        _context: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        Ok(())
    }

    /// Message that replaces the standard success summary.
    fn success_message(&self, _response: &Self::Response) -> Option<String> {
        None
    }

    /// Performs the operation. A message left in `response` is appended to
    /// the success summary; the returned bytes travel as binary data.
    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<Self::Request>,
        response: &mut Self::Response,
    ) -> Result<Option<Vec<u8>>, CommandError>;
}

/// Runs a [`DmrOperation`] with endpoint resolution, policy checks, session
/// handling and response shaping.
#[derive(Debug, Default, Clone, Copy)]
pub struct DmrResourcePathCommand<H> {
    operation: H,
}

impl<H: DmrOperation> DmrResourcePathCommand<H> {
    /// Wraps `operation`.
    pub const fn new(operation: H) -> Self {
        Self { operation }
    }

    /// The wrapped operation.
    pub const fn operation(&self) -> &H {
        &self.operation
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
        self.operation
            .validate_path(parts.id_part(), &envelope.basic_message)?;

        let engine = context.engine();
        let service = engine
            .protocols()
            .dmr()
            .get(parts.managed_server_name())
            .ok_or_else(|| {
                CommandError::unknown_managed_server(
                    invocation.operation(),
                    H::ENTITY,
                    invocation.raw_path(),
                    parts.managed_server_name(),
                )
            })?;
        self.operation
            .validate_endpoint(service.monitored_endpoint(), context)?;
        if self.operation.modifies_resource() && engine.is_immutable() {
            return Err(CommandError::Immutable);
        }

        let session = SessionGuard::new(service.open_session()?);
        let call = DmrCall {
            client: session.client(),
            service: &*service,
            resource_id: &resource_id,
            resource_path: invocation.raw_path(),
            model_node_path: parts.id_part(),
            context,
        };
        self.operation.execute(&call, envelope, response)
    }
}

impl<H: DmrOperation> Command for DmrResourcePathCommand<H> {
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
                match self.operation.success_message(&response) {
                    Some(message) => invocation.succeed_with(&mut response, message),
                    None => invocation.succeed(&mut response),
                }
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
