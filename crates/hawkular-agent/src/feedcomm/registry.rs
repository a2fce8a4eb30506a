//! Lookup of commands by request name.

use std::collections::BTreeMap;

use crate::cmd::commands::{
    AddDatasourceCommand, AddJdbcDriverCommand, DeployApplicationCommand,
    DisableApplicationCommand, EchoCommand, EnableApplicationCommand, ExecuteOperationCommand,
    GenericErrorCommand, RemoveDatasourceCommand, RemoveJdbcDriverCommand,
    RestartApplicationCommand, UndeployApplicationCommand, UpdateDatasourceCommand,
};
use crate::cmd::{Command, DynCommand};

/// Commands keyed by the wire name of the request they answer.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn DynCommand>>,
}

impl CommandRegistry {
    /// A registry without commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command the agent answers.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AddDatasourceCommand::default());
        registry.register(UpdateDatasourceCommand::default());
        registry.register(RemoveDatasourceCommand::default());
        registry.register(AddJdbcDriverCommand::default());
        registry.register(RemoveJdbcDriverCommand::default());
        registry.register(DeployApplicationCommand::default());
        registry.register(UndeployApplicationCommand::default());
        registry.register(EnableApplicationCommand::default());
        registry.register(DisableApplicationCommand::default());
        registry.register(RestartApplicationCommand::default());
        registry.register(ExecuteOperationCommand::execute_operation());
        registry.register(EchoCommand);
        registry.register(GenericErrorCommand);
        registry
    }

    /// Registers `command` under its request name, replacing any previous one.
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let boxed: Box<dyn DynCommand> = Box::new(command);
        self.commands.insert(boxed.request_name(), boxed);
    }

    /// The command answering `request_name`.
    #[must_use]
    pub fn get(&self, request_name: &str) -> Option<&dyn DynCommand> {
        self.commands.get(request_name).map(Box::as_ref)
    }

    /// Registered request names in order.
    pub fn request_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }
}
