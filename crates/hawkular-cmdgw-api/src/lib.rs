//! Message types and framing for the Hawkular command gateway.
//!
//! Every frame is `Name=<json>` optionally followed by raw bytes, for
//! example an application archive or a JDBC driver jar. Requests travel from
//! UI clients to the agent; responses travel back. The agent dispatches on
//! [`RawMessage::name`] and decodes the body into the matching request type.

mod codec;
mod error;
mod lenient;
mod message;
mod requests;
mod responses;
mod types;

pub use codec::{RawMessage, decode, decode_as, encode};
pub use error::CodecError;
pub use message::{ApiMessage, MessageEnvelope};
pub use requests::{
    AddDatasourceRequest, AddJdbcDriverRequest, DatasourceFields, DeployApplicationRequest,
    DeploymentFields, DisableApplicationRequest, EchoRequest, EnableApplicationRequest,
    ExecuteOperationRequest, RemoveDatasourceRequest, RemoveJdbcDriverRequest,
    ResourceRequest, ResourceRequestFields, RestartApplicationRequest, UndeployApplicationRequest,
    UpdateDatasourceRequest,
};
pub use responses::{
    AddDatasourceResponse, AddJdbcDriverResponse, DeployApplicationResponse,
    DisableApplicationResponse, EchoResponse, EnableApplicationResponse, ExecuteOperationResponse,
    GenericErrorResponse, GenericSuccessResponse, RemoveDatasourceResponse,
    RemoveJdbcDriverResponse, ResourceResponse, ResourceResponseFields,
    RestartApplicationResponse, UndeployApplicationResponse, UpdateDatasourceResponse,
};
pub use types::{Authentication, ResponseStatus, ServerRefreshIndicator};

/// Response name expected for a request name: `EchoRequest` → `EchoResponse`.
///
/// Names without a `Request` suffix are returned unchanged.
#[must_use]
pub fn response_name_for(request_name: &str) -> String {
    request_name
        .strip_suffix("Request")
        .map_or_else(|| request_name.to_owned(), |stem| format!("{stem}Response"))
}
