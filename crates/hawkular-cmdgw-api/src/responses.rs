//! Responses sent by the agent.

use serde::{Deserialize, Serialize};

use crate::message::ApiMessage;
use crate::requests::ResourceRequestFields;
use crate::types::{Authentication, ResponseStatus, ServerRefreshIndicator};

/// Members shared by every response about a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponseFields {
    /// Resource the request named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Feed the request named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    /// Outcome; `ERROR` until the command explicitly succeeds.
    #[serde(default)]
    pub status: ResponseStatus,
    /// Human readable outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// What the server needs before the change is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_refresh_indicator: Option<ServerRefreshIndicator>,
    /// Credentials copied from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

impl ResourceResponseFields {
    /// Copies the resource, feed, and credentials of `request`.
    #[must_use]
    pub fn answering(request: &ResourceRequestFields) -> Self {
        Self {
            resource_id: request.resource_id.clone(),
            feed_id: request.feed_id.clone(),
            authentication: request.authentication.clone(),
            ..Self::default()
        }
    }
}

/// A response about a resource.
pub trait ResourceResponse: ApiMessage + Default {
    /// Shared members.
    fn resource(&self) -> &ResourceResponseFields;

    /// Shared members, mutably.
    fn resource_mut(&mut self) -> &mut ResourceResponseFields;

    /// Outcome.
    fn status(&self) -> ResponseStatus {
        self.resource().status
    }

    /// Human readable outcome.
    fn message(&self) -> Option<&str> {
        self.resource().message.as_deref()
    }
}

macro_rules! resource_response {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl ApiMessage for $ty {
                const NAME: &'static str = stringify!($ty);
                const CARRIES_AUTHENTICATION: bool = true;

                fn authentication(&self) -> Option<&Authentication> {
                    self.resource.authentication.as_ref()
                }
            }

            impl ResourceResponse for $ty {
                fn resource(&self) -> &ResourceResponseFields {
                    &self.resource
                }

                fn resource_mut(&mut self) -> &mut ResourceResponseFields {
                    &mut self.resource
                }
            }
        )+
    };
}

/// Answer to [`crate::AddDatasourceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDatasourceResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Name of the datasource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_name: Option<String>,
}

/// Answer to [`crate::UpdateDatasourceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatasourceResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Name of the datasource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_name: Option<String>,
}

/// Answer to [`crate::RemoveDatasourceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoveDatasourceResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
}

/// Answer to [`crate::AddJdbcDriverRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJdbcDriverResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Name of the driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
}

/// Answer to [`crate::RemoveJdbcDriverRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoveJdbcDriverResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
}

/// Answer to [`crate::DeployApplicationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployApplicationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
}

/// Answer to [`crate::UndeployApplicationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeployApplicationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
}

/// Answer to [`crate::EnableApplicationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableApplicationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
}

/// Answer to [`crate::DisableApplicationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableApplicationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
}

/// Answer to [`crate::RestartApplicationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartApplicationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Deployment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
}

/// Answer to [`crate::ExecuteOperationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOperationResponse {
    /// Shared members.
    #[serde(flatten)]
    pub resource: ResourceResponseFields,
    /// Operation that was invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

resource_response!(
    AddDatasourceResponse,
    UpdateDatasourceResponse,
    RemoveDatasourceResponse,
    AddJdbcDriverResponse,
    RemoveJdbcDriverResponse,
    DeployApplicationResponse,
    UndeployApplicationResponse,
    EnableApplicationResponse,
    DisableApplicationResponse,
    RestartApplicationResponse,
    ExecuteOperationResponse,
);

/// Reply to [`crate::EchoRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoResponse {
    /// `ECHO [message]`.
    pub reply: String,
}

impl ApiMessage for EchoResponse {
    const NAME: &'static str = "EchoResponse";
}

/// Reported when a request could not be handled at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericErrorResponse {
    /// Description of the failure.
    pub error_message: String,
    /// Rendered error chain.
    #[serde(default)]
    pub stack_trace: String,
}

impl ApiMessage for GenericErrorResponse {
    const NAME: &'static str = "GenericErrorResponse";
}

/// Reported for commands without a dedicated response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericSuccessResponse {
    /// Description of the outcome.
    #[serde(default)]
    pub message: String,
}

impl ApiMessage for GenericSuccessResponse {
    const NAME: &'static str = "GenericSuccessResponse";
}
