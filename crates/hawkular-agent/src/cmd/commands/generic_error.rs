//! Error notifications pushed by the gateway.

use hawkular_cmdgw_api::{GenericErrorResponse, GenericSuccessResponse, MessageEnvelope};
use tracing::warn;

use crate::cmd::{CMD_TARGET, Command, CommandContext};

/// Logs a [`GenericErrorResponse`] received from the gateway. Nothing is
/// sent back.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericErrorCommand;

impl Command for GenericErrorCommand {
    type Request = GenericErrorResponse;
    type Response = GenericSuccessResponse;

    const CHANGES_INVENTORY: bool = false;

    fn execute(
        &self,
        envelope: MessageEnvelope<GenericErrorResponse>,
        _context: &CommandContext<'_>,
    ) -> Option<MessageEnvelope<GenericSuccessResponse>> {
        let notification = envelope.basic_message;
        warn!(
            target: CMD_TARGET,
            error_message = %notification.error_message,
            stack_trace = %notification.stack_trace,
            "gateway reported an error"
        );
        None
    }
}
