//! Liveness probe.

use hawkular_cmdgw_api::{EchoRequest, EchoResponse, MessageEnvelope};

use crate::cmd::{Command, CommandContext};

/// Answers an [`EchoRequest`] with `ECHO [<message>]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoCommand;

impl Command for EchoCommand {
    type Request = EchoRequest;
    type Response = EchoResponse;

    const CHANGES_INVENTORY: bool = false;

    fn execute(
        &self,
        envelope: MessageEnvelope<EchoRequest>,
        _context: &CommandContext<'_>,
    ) -> Option<MessageEnvelope<EchoResponse>> {
        let reply = format!("ECHO [{}]", envelope.basic_message.echo_message);
        Some(MessageEnvelope::new(EchoResponse { reply }))
    }
}
