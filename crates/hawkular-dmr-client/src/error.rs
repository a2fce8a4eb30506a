//! Errors raised by DMR operations.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Failures talking to a managed server's management model.
#[derive(Debug, Clone, Error)]
pub enum DmrError {
    /// The server executed the request and reported a failed outcome.
    #[error("Could not perform operation [{operation}]: {description}")]
    OperationFailed {
        /// Name of the rejected operation.
        operation: String,
        /// The server's `failure-description`.
        description: String,
    },

    /// The request never produced an outcome (connection loss, IO error).
    #[error("management client failure: {message}")]
    Transport {
        /// What the client was doing.
        message: String,
        /// Underlying IO error, when there is one.
        #[source]
        source: Option<Arc<io::Error>>,
    },

    /// The server answered with a result that has an unexpected shape.
    #[error("unexpected result for [{operation}]: {message}")]
    UnexpectedResult {
        /// Operation whose result was inspected.
        operation: String,
        /// Description of the mismatch.
        message: String,
    },
}

impl DmrError {
    /// Creates an operation failure.
    pub fn operation_failed(operation: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            description: description.into(),
        }
    }

    /// Creates a transport failure without an IO source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport failure caused by an IO error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates an unexpected-result error.
    pub fn unexpected_result(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true when the management API itself rejected the request.
    ///
    /// Some server versions fail a first removal of a freshly touched
    /// resource and accept an identical second attempt; callers use this to
    /// decide whether to try again.
    #[must_use]
    pub const fn is_api_failure(&self) -> bool {
        matches!(self, Self::OperationFailed { .. })
    }
}
