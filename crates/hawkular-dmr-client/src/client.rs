//! Seam over the vendor management client.

use crate::error::DmrError;
use crate::operation::OperationRequest;
use crate::result::OperationResult;

/// Connection to one server's management model.
///
/// Implementations wrap the vendor wire client. A connection is used by a
/// single command at a time and closed when the command finishes.
pub trait ModelControllerClient: Send {
    /// Executes `request` and returns the server's response node.
    ///
    /// # Errors
    ///
    /// Returns [`DmrError::Transport`] when no response could be obtained.
    /// A response with a failed outcome is still `Ok`; use
    /// [`OperationResult::assert_success`] to turn it into an error.
    fn execute(&self, request: &OperationRequest) -> Result<OperationResult, DmrError>;

    /// Releases the connection.
    ///
    /// # Errors
    ///
    /// Returns [`DmrError::Transport`] when the connection could not be shut
    /// down cleanly.
    fn close(&self) -> Result<(), DmrError>;
}

impl<T: ModelControllerClient + ?Sized> ModelControllerClient for Box<T> {
    fn execute(&self, request: &OperationRequest) -> Result<OperationResult, DmrError> {
        (**self).execute(request)
    }

    fn close(&self) -> Result<(), DmrError> {
        (**self).close()
    }
}

/// Executes `request` and asserts a successful outcome.
///
/// # Errors
///
/// Returns the transport error, or [`DmrError::OperationFailed`] naming
/// `operation` when the server rejected the request.
pub fn execute_checked(
    client: &dyn ModelControllerClient,
    request: &OperationRequest,
    operation: &str,
) -> Result<OperationResult, DmrError> {
    client.execute(request)?.assert_success(operation)
}
