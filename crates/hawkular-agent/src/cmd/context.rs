//! Per-invocation state handed to commands.

use crate::engine::AgentCoreEngine;

/// What a command may consult while it runs.
///
/// A context lives for one command invocation. Response listeners are not
/// part of it; the gateway processor passes them per call.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    engine: &'a AgentCoreEngine,
}

impl<'a> CommandContext<'a> {
    /// A context backed by `engine`.
    #[must_use]
    pub const fn new(engine: &'a AgentCoreEngine) -> Self {
        Self { engine }
    }

    /// The running agent.
    #[must_use]
    pub const fn engine(&self) -> &'a AgentCoreEngine {
        self.engine
    }
}
