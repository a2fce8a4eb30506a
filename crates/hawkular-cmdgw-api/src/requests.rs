//! Requests sent by UI clients to the agent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::message::ApiMessage;
use crate::types::Authentication;

/// Members shared by every request aimed at a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequestFields {
    /// Target resource; older clients send it as `resourcePath`.
    #[serde(default, alias = "resourcePath", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Feed owning the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    /// Caller credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

/// A request naming a target resource.
pub trait ResourceRequest: ApiMessage {
    /// Shared resource members.
    fn resource(&self) -> &ResourceRequestFields;

    /// Target resource id, if given.
    fn resource_id(&self) -> Option<&str> {
        self.resource().resource_id.as_deref()
    }

    /// Feed id, if given.
    fn feed_id(&self) -> Option<&str> {
        self.resource().feed_id.as_deref()
    }
}

macro_rules! resource_request {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl ApiMessage for $ty {
                const NAME: &'static str = stringify!($ty);
                const CARRIES_AUTHENTICATION: bool = true;

                fn authentication(&self) -> Option<&Authentication> {
                    self.resource.authentication.as_ref()
                }
            }

            impl ResourceRequest for $ty {
                fn resource(&self) -> &ResourceRequestFields {
                    &self.resource
                }
            }
        )+
    };
}

/// Datasource settings shared by add and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceFields {
    /// Datasource resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_name: Option<String>,
    /// JNDI binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jndi_name: Option<String>,
    /// Name of an installed JDBC driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    /// Driver class for non-XA datasources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_class: Option<String>,
    /// XA datasource class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xa_data_source_class: Option<String>,
    /// JDBC URL for non-XA datasources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_url: Option<String>,
    /// Database user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Database password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connection properties (non-XA) or XA datasource properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub datasource_properties: BTreeMap<String, String>,
}

/// Creates a datasource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDatasourceRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Whether an XA datasource is requested.
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub xa_datasource: Option<bool>,
    /// Datasource settings.
    #[serde(flatten)]
    pub datasource: DatasourceFields,
}

/// Changes an existing datasource.
///
/// Unset members keep their current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatasourceRequest {
    /// Target datasource resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Datasource settings.
    #[serde(flatten)]
    pub datasource: DatasourceFields,
}

/// Removes a datasource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoveDatasourceRequest {
    /// Target datasource resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
}

/// Installs a JDBC driver module and registers the driver.
///
/// The driver jar travels as binary data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJdbcDriverRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Driver resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    /// Dotted module name to install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Driver class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_class: Option<String>,
    /// Major version of the driver.
    #[serde(default, deserialize_with = "lenient::opt_i32", skip_serializing_if = "Option::is_none")]
    pub driver_major_version: Option<i32>,
    /// Minor version of the driver.
    #[serde(default, deserialize_with = "lenient::opt_i32", skip_serializing_if = "Option::is_none")]
    pub driver_minor_version: Option<i32>,
    /// XA datasource class provided by the driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_xa_datasource_class_name: Option<String>,
    /// File name given to the jar inside the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_jar_name: Option<String>,
    /// Whether the driver is JDBC compliant.
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub jdbc_compliant: Option<bool>,
}

/// Removes a JDBC driver registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoveJdbcDriverRequest {
    /// Target driver resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
}

/// Members naming a deployment and its server groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFields {
    /// Deployment name on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_name: Option<String>,
    /// Comma separated server groups; absent for standalone servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_groups: Option<String>,
}

impl DeploymentFields {
    /// Parses [`DeploymentFields::server_groups`] into trimmed, non-empty names.
    #[must_use]
    pub fn server_group_set(&self) -> std::collections::BTreeSet<String> {
        self.server_groups
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Uploads and deploys an application archive carried as binary data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployApplicationRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Deployment name and groups.
    #[serde(flatten)]
    pub deployment: DeploymentFields,
    /// Activate after upload; defaults to true.
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replace existing content; defaults to true.
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub force_deploy: Option<bool>,
}

/// Removes a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeployApplicationRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Deployment name and groups.
    #[serde(flatten)]
    pub deployment: DeploymentFields,
    /// Delete stored content too; defaults to true.
    #[serde(default, deserialize_with = "lenient::opt_bool", skip_serializing_if = "Option::is_none")]
    pub remove_content: Option<bool>,
}

/// Activates a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnableApplicationRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Deployment name and groups.
    #[serde(flatten)]
    pub deployment: DeploymentFields,
}

/// Deactivates a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisableApplicationRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Deployment name and groups.
    #[serde(flatten)]
    pub deployment: DeploymentFields,
}

/// Redeploys a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RestartApplicationRequest {
    /// Target server resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Deployment name and groups.
    #[serde(flatten)]
    pub deployment: DeploymentFields,
}

/// Invokes an operation declared by the resource's type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOperationRequest {
    /// Target resource.
    #[serde(flatten)]
    pub resource: ResourceRequestFields,
    /// Declared operation name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Parameter values as text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

resource_request!(
    AddDatasourceRequest,
    UpdateDatasourceRequest,
    RemoveDatasourceRequest,
    AddJdbcDriverRequest,
    RemoveJdbcDriverRequest,
    DeployApplicationRequest,
    UndeployApplicationRequest,
    EnableApplicationRequest,
    DisableApplicationRequest,
    RestartApplicationRequest,
    ExecuteOperationRequest,
);

/// Liveness probe answered with the message echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoRequest {
    /// Text to echo.
    #[serde(default)]
    pub echo_message: String,
    /// Caller credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

impl ApiMessage for EchoRequest {
    const NAME: &'static str = "EchoRequest";
    const CARRIES_AUTHENTICATION: bool = true;

    fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }
}
