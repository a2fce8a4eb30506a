//! Bounded retries for management operations.

use hawkular_dmr_client::DmrError;
use tracing::warn;

use super::CMD_TARGET;

/// How often an operation is attempted and which failures justify another try.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    retryable: fn(&DmrError) -> bool,
}

impl RetryPolicy {
    /// Two attempts, retrying only when the management API rejected the first.
    ///
    /// Some server versions fail the first removal of a freshly touched node
    /// and accept an identical second request.
    pub const MODEL_NODE_CHANGE: Self = Self::new(2, DmrError::is_api_failure);

    /// A single attempt.
    pub const ONCE: Self = Self::new(1, DmrError::is_api_failure);

    /// A policy with `max_attempts` (at least one) and a failure predicate.
    #[must_use]
    pub const fn new(max_attempts: u32, retryable: fn(&DmrError) -> bool) -> Self {
        Self {
            max_attempts,
            retryable,
        }
    }

    /// Total attempts allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts are used up. `what` names the operation in logs.
    pub fn run<T, F>(&self, what: &str, mut operation: F) -> Result<T, DmrError>
    where
        F: FnMut() -> Result<T, DmrError>,
    {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts() && (self.retryable)(&error) => {
                    attempt += 1;
                    warn!(
                        target: CMD_TARGET,
                        attempt,
                        error = %error,
                        "Attempt #{attempt} to {what}"
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }
}
