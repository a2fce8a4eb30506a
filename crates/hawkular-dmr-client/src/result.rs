//! Outcome of an executed management operation.

use serde_json::Value;
use tracing::warn;

use crate::DMR_TARGET;
use crate::error::DmrError;

const SUCCESS: &str = "success";

/// Restart requirement reported by the server after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// The change takes effect after a reload.
    ReloadRequired,
    /// The change takes effect after a full restart.
    RestartRequired,
}

impl ProcessState {
    /// Parses the `process-state` response header.
    ///
    /// `running` (and anything unrecognised) maps to `None`.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "reload-required" => Some(Self::ReloadRequired),
            "restart-required" => Some(Self::RestartRequired),
            _ => None,
        }
    }
}

/// The response node returned for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    node: Value,
}

impl OperationResult {
    /// Wraps a response node.
    #[must_use]
    pub const fn new(node: Value) -> Self {
        Self { node }
    }

    /// The raw response node.
    #[must_use]
    pub const fn node(&self) -> &Value {
        &self.node
    }

    /// Whether `outcome` is `success`. A missing outcome is a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.node.get("outcome").and_then(Value::as_str) == Some(SUCCESS)
    }

    /// The `failure-description`, rendered as text.
    #[must_use]
    pub fn failure_description(&self) -> String {
        match self.node.get("failure-description") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "undefined".to_owned(),
        }
    }

    /// Returns the result unchanged when it succeeded, otherwise an
    /// [`DmrError::OperationFailed`] naming `operation`.
    ///
    /// # Errors
    ///
    /// Fails when the outcome is anything other than `success`.
    pub fn assert_success(self, operation: &str) -> Result<Self, DmrError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DmrError::operation_failed(
                operation,
                self.failure_description(),
            ))
        }
    }

    /// The `result` node.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.node.get("result")
    }

    /// Reads `response-headers.process-state`.
    #[must_use]
    pub fn process_state(&self) -> Option<ProcessState> {
        let raw = self
            .node
            .get("response-headers")
            .and_then(|headers| headers.get("process-state"))
            .and_then(Value::as_str)?;
        let state = ProcessState::from_header(raw);
        if state.is_none() && raw != "running" {
            warn!(
                target: DMR_TARGET,
                process_state = raw,
                "ignoring unrecognised process state"
            );
        }
        state
    }
}
