//! Turns one inbound gateway frame into at most one outbound frame.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hawkular_cmdgw_api::{
    ApiMessage, CodecError, GenericErrorResponse, RawMessage, ResponseStatus, decode,
};
use tracing::{debug, error, warn};

use super::registry::CommandRegistry;
use super::{FEEDCOMM_TARGET, ResponseListener};
use crate::cmd::{CommandContext, error_chain};
use crate::engine::AgentCoreEngine;

/// Request name reported when a frame could not even be decoded.
pub const UNKNOWN_REQUEST: &str = "?";

/// The outcome of processing one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    request_name: String,
    changes_inventory: bool,
    response: Option<RawMessage>,
}

impl Exchange {
    /// An outcome produced outside the processor, for example by another
    /// transport.
    #[must_use]
    pub fn new(
        request_name: impl Into<String>,
        changes_inventory: bool,
        response: Option<RawMessage>,
    ) -> Self {
        Self {
            request_name: request_name.into(),
            changes_inventory,
            response,
        }
    }

    /// Name of the request, or `?` when the frame was undecodable.
    #[must_use]
    pub fn request_name(&self) -> &str {
        &self.request_name
    }

    /// Whether the command that ran may have changed a managed server.
    #[must_use]
    pub const fn changes_inventory(&self) -> bool {
        self.changes_inventory
    }

    /// The reply, if the request needs one.
    #[must_use]
    pub const fn response(&self) -> Option<&RawMessage> {
        self.response.as_ref()
    }

    /// Status carried by the reply body, when it has one.
    #[must_use]
    pub fn response_status(&self) -> Option<ResponseStatus> {
        let status = self.response.as_ref()?.body().get("status")?;
        serde_json::from_value(status.clone()).ok()
    }

    fn failure(request_name: String, error_message: String, stack_trace: String) -> Self {
        let response = generic_error(error_message, stack_trace);
        Self {
            request_name,
            changes_inventory: false,
            response,
        }
    }
}

/// Dispatches decoded requests to registered commands.
///
/// Nothing a command does escapes as a panic or an error; every failure
/// becomes a `GenericErrorResponse`.
pub struct FeedCommProcessor {
    registry: CommandRegistry,
    engine: Arc<AgentCoreEngine>,
}

impl FeedCommProcessor {
    /// A processor answering with `registry` on behalf of `engine`.
    #[must_use]
    pub const fn new(registry: CommandRegistry, engine: Arc<AgentCoreEngine>) -> Self {
        Self { registry, engine }
    }

    /// The engine commands run against.
    #[must_use]
    pub fn engine(&self) -> &AgentCoreEngine {
        &self.engine
    }

    /// Runs the command named by `frame` and shapes its reply.
    pub fn process(&self, frame: &[u8]) -> Exchange {
        let mut request_name = UNKNOWN_REQUEST.to_owned();
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(frame, &mut request_name)));
        let mut exchange = match outcome {
            Ok(Ok(exchange)) => exchange,
            Ok(Err(failure)) => {
                let trace = error_chain(&failure);
                error!(
                    target: FEEDCOMM_TARGET,
                    request = %request_name,
                    error = %trace,
                    "command execution failed"
                );
                let message = format!("Command failed [{request_name}]");
                Exchange::failure(request_name, message, trace)
            }
            Err(payload) => {
                let trace = panic_message(payload.as_ref());
                error!(
                    target: FEEDCOMM_TARGET,
                    request = %request_name,
                    panic = %trace,
                    "command panicked"
                );
                let message = format!("Command failed [{request_name}]");
                Exchange::failure(request_name, message, trace)
            }
        };

        if let (Some(response), Some(authentication)) = (
            exchange.response.as_mut(),
            self.engine.storage_authentication(),
        ) && response.fill_authentication(&authentication)
        {
            debug!(
                target: FEEDCOMM_TARGET,
                response = response.name(),
                "attached storage credentials"
            );
        }
        exchange
    }

    /// Writes the reply of `exchange` to `out`, then tells every listener
    /// how the send went. Requests without a reply notify nobody.
    ///
    /// # Errors
    ///
    /// Returns the write failure after the listeners have seen it.
    pub fn send<W: Write>(
        &self,
        exchange: &Exchange,
        out: &mut W,
        listeners: &[Arc<dyn ResponseListener>],
    ) -> io::Result<()> {
        let Some(response) = exchange.response() else {
            return Ok(());
        };
        let result = out
            .write_all(&response.encode())
            .and_then(|()| out.flush());
        if let Err(failure) = &result {
            warn!(
                target: FEEDCOMM_TARGET,
                response = response.name(),
                error = %failure,
                "failed to send response"
            );
        }
        let outcome = result.as_ref().copied();
        for listener in listeners {
            listener.on_response(exchange, outcome);
        }
        result
    }

    fn dispatch(&self, frame: &[u8], request_name: &mut String) -> Result<Exchange, CodecError> {
        let request = decode(frame)?;
        *request_name = request.name().to_owned();
        debug!(target: FEEDCOMM_TARGET, request = %request_name, "received message");

        let Some(command) = self.registry.get(request.name()) else {
            error!(
                target: FEEDCOMM_TARGET,
                request = %request_name,
                "invalid command request"
            );
            return Ok(Exchange::failure(
                request_name.clone(),
                format!("Invalid command request: {request_name}"),
                String::new(),
            ));
        };

        let context = CommandContext::new(&self.engine);
        let response = command.run(request, &context)?;
        Ok(Exchange {
            request_name: request_name.clone(),
            changes_inventory: command.changes_inventory(),
            response,
        })
    }
}

fn generic_error(error_message: String, stack_trace: String) -> Option<RawMessage> {
    let body = GenericErrorResponse {
        error_message,
        stack_trace,
    };
    match RawMessage::from_message(body) {
        Ok(raw) => Some(raw),
        Err(failure) => {
            error!(
                target: FEEDCOMM_TARGET,
                response = GenericErrorResponse::NAME,
                error = %failure,
                "cannot encode error response"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "command panicked".to_owned())
}
