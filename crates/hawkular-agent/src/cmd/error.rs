//! Failures a command reports back to the caller.
//!
//! Every variant renders the exact text placed in the response message, so
//! the wording here is part of the gateway contract.

use hawkular_dmr_client::{DmrError, ModuleError};
use thiserror::Error;

use crate::id::IdError;
use crate::params::ParamError;
use crate::protocol::{JmxError, SessionError};

/// Errors raised while validating or executing a command.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The request names no resource.
    #[error("resourceId of a [{entity}] cannot be null")]
    MissingResourceId {
        /// Entity the command acts on.
        entity: &'static str,
    },

    /// The resource id or path could not be interpreted.
    #[error(transparent)]
    Id(#[from] IdError),

    /// No endpoint of the expected protocol is registered under the name.
    #[error(
        "Cannot perform [{operation}] on a [{entity}] given by inventory path [{path}]: unknown managed server [{server}]"
    )]
    UnknownManagedServer {
        /// Operation the command performs.
        operation: String,
        /// Entity the command acts on.
        entity: &'static str,
        /// Resource path as sent by the caller.
        path: String,
        /// Managed-server name taken from the path.
        server: String,
    },

    /// A mutating command arrived while the agent is immutable.
    #[error("Command not allowed because the agent is immutable")]
    Immutable,

    /// A filesystem-touching command targets a server on another host.
    #[error("Cannot perform [{operation}] on a [{entity}] on a non local instance of [{server}].")]
    NonLocal {
        /// Operation the command performs.
        operation: &'static str,
        /// Entity the command acts on.
        entity: &'static str,
        /// Managed-server name.
        server: String,
    },

    /// The resource is not in the endpoint's inventory.
    #[error("Cannot {action}: unknown resource [{resource}]")]
    UnknownResource {
        /// What was attempted, for example `deploy application`.
        action: &'static str,
        /// Resource path as sent by the caller.
        resource: String,
    },

    /// The resource's type does not declare the needed operation.
    #[error("Cannot {action} [{resource}]. That feature is disabled.")]
    FeatureDisabled {
        /// What was attempted, for example `deploy application to`.
        action: &'static str,
        /// The resource, rendered with its type and location.
        resource: String,
    },

    /// The resource's type does not declare the requested operation.
    #[error("Cannot execute operation: unknown operation [{operation}] for resource [{resource}]")]
    UnknownOperation {
        /// Requested operation name.
        operation: String,
        /// The resource, rendered with its type and location.
        resource: String,
    },

    /// The resolved operation mutates while the agent is immutable.
    #[error("Operation [{operation}] not allowed because the agent is immutable")]
    OperationImmutable {
        /// Requested operation name.
        operation: String,
    },

    /// An operation argument could not be built.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// The request tries to rename a datasource.
    #[error("Renaming a [Datasource] is not supported. Old name: [{old}], new name: [{new}]")]
    Rename {
        /// Name in the current address.
        old: String,
        /// Name in the request.
        new: String,
    },

    /// The address does not name a node of the expected kind.
    #[error("Cannot {action}: [{path}] is not a {expected} address")]
    UnexpectedAddress {
        /// What was attempted.
        action: &'static str,
        /// The model-node path.
        path: String,
        /// Expected node kind.
        expected: &'static str,
    },

    /// A required request member is absent or blank.
    #[error("Missing [{field}] in the [{entity}] request")]
    MissingField {
        /// Wire name of the member.
        field: &'static str,
        /// Entity the command acts on.
        entity: &'static str,
    },

    /// The request carries no binary attachment.
    #[error("Missing binary data: {what}")]
    MissingBinary {
        /// What the attachment should have been.
        what: &'static str,
    },

    /// The server installation directory needed for modules is unknown.
    #[error("Cannot install module for [{server}]: the server installation directory is unknown")]
    ModulesRootUnknown {
        /// Managed-server name.
        server: String,
    },

    /// The managed server rejected an operation or could not be reached.
    #[error(transparent)]
    Dmr(#[from] DmrError),

    /// An MBean invocation failed.
    #[error(transparent)]
    Jmx(#[from] JmxError),

    /// No session could be opened.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A module could not be installed.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl CommandError {
    /// The request names no resource.
    pub const fn missing_resource_id(entity: &'static str) -> Self {
        Self::MissingResourceId { entity }
    }

    /// No endpoint is registered under `server`.
    pub fn unknown_managed_server(
        operation: impl Into<String>,
        entity: &'static str,
        path: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self::UnknownManagedServer {
            operation: operation.into(),
            entity,
            path: path.into(),
            server: server.into(),
        }
    }

    /// The endpoint is not local to the agent.
    pub fn non_local(operation: &'static str, entity: &'static str, server: impl Into<String>) -> Self {
        Self::NonLocal {
            operation,
            entity,
            server: server.into(),
        }
    }

    /// The resource is not in the inventory.
    pub fn unknown_resource(action: &'static str, resource: impl Into<String>) -> Self {
        Self::UnknownResource {
            action,
            resource: resource.into(),
        }
    }

    /// The resource's type does not declare the operation.
    pub fn feature_disabled(action: &'static str, resource: impl ToString) -> Self {
        Self::FeatureDisabled {
            action,
            resource: resource.to_string(),
        }
    }

    /// The requested operation is not declared.
    pub fn unknown_operation(operation: impl Into<String>, resource: impl ToString) -> Self {
        Self::UnknownOperation {
            operation: operation.into(),
            resource: resource.to_string(),
        }
    }

    /// The resolved operation mutates while the agent is immutable.
    pub fn operation_immutable(operation: impl Into<String>) -> Self {
        Self::OperationImmutable {
            operation: operation.into(),
        }
    }

    /// The request tries to rename a datasource.
    pub fn rename(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::Rename {
            old: old.into(),
            new: new.into(),
        }
    }

    /// The address does not name a node of the expected kind.
    pub fn unexpected_address(
        action: &'static str,
        path: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::UnexpectedAddress {
            action,
            path: path.into(),
            expected,
        }
    }

    /// A required member is missing.
    pub const fn missing_field(field: &'static str, entity: &'static str) -> Self {
        Self::MissingField { field, entity }
    }

    /// No binary attachment was sent.
    pub const fn missing_binary(what: &'static str) -> Self {
        Self::MissingBinary { what }
    }
}

/// Returns the trimmed value of a required member.
pub(crate) fn require<'a>(
    value: Option<&'a str>,
    field: &'static str,
    entity: &'static str,
) -> Result<&'a str, CommandError> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(CommandError::missing_field(field, entity))
}
