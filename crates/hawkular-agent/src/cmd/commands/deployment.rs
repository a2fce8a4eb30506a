//! Application deployment commands.
//!
//! Every command first checks that the target resource's type declares the
//! matching operation. A server type without it has the feature switched
//! off, and the command fails before any management call is made.

use std::collections::BTreeSet;

use hawkular_cmdgw_api::{
    DeployApplicationRequest, DeployApplicationResponse, DeploymentFields,
    DisableApplicationRequest, DisableApplicationResponse, EnableApplicationRequest,
    EnableApplicationResponse, MessageEnvelope, RestartApplicationRequest,
    RestartApplicationResponse, ServerRefreshIndicator, UndeployApplicationRequest,
    UndeployApplicationResponse,
};
use hawkular_dmr_client::{DeployOptions, DeploymentClient, DmrError, OperationResult};
use tracing::trace;

use crate::cmd::{CMD_TARGET, CommandError, DmrCall, DmrOperation, refresh_indicator, require};

const ENTITY: &str = "Application";

/// Wording and declared operation for one deployment action.
struct Action {
    /// Name the resource type must declare.
    declared: &'static str,
    /// Used as `Cannot {unknown}: unknown resource [..]`.
    unknown: &'static str,
    /// Used as `Cannot {disabled} [..]. That feature is disabled.`
    disabled: &'static str,
}

const DEPLOY: Action = Action {
    declared: "Deploy",
    unknown: "deploy application",
    disabled: "deploy application to",
};
const UNDEPLOY: Action = Action {
    declared: "Undeploy",
    unknown: "undeploy application",
    disabled: "undeploy application from",
};
const ENABLE: Action = Action {
    declared: "Enable Deployment",
    unknown: "enable application",
    disabled: "enable application on",
};
const DISABLE: Action = Action {
    declared: "Disable Deployment",
    unknown: "disable application",
    disabled: "disable application on",
};
const RESTART: Action = Action {
    declared: "Restart Deployment",
    unknown: "restart application",
    disabled: "restart application on",
};

impl Action {
    /// Fails unless the resource exists and its type declares the action.
    fn check(&self, call: &DmrCall<'_>) -> Result<(), CommandError> {
        let resource = call
            .service
            .resource_manager()
            .get_resource(call.resource_id)
            .ok_or_else(|| CommandError::unknown_resource(self.unknown, call.resource_path))?;
        trace!(
            target: CMD_TARGET,
            operation = self.declared,
            resource = %resource.id,
            "searching declared operations"
        );
        if resource.resource_type.declares(self.declared) {
            Ok(())
        } else {
            Err(CommandError::feature_disabled(self.disabled, &resource))
        }
    }
}

fn destination(fields: &DeploymentFields) -> Result<&str, CommandError> {
    require(
        fields.destination_file_name.as_deref(),
        "destinationFileName",
        ENTITY,
    )
}

/// Shared tail of every deployment command.
fn finish(
    call: &DmrCall<'_>,
    result: &OperationResult,
    indicator: &mut Option<ServerRefreshIndicator>,
) {
    *indicator = Some(refresh_indicator(result));
    call.service.discover_all();
}

/// Uploads an application archive carried as binary data.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeployApplication;

impl DmrOperation for DeployApplication {
    type Request = DeployApplicationRequest;
    type Response = DeployApplicationResponse;

    const OPERATION: &'static str = "Deploy";
    const ENTITY: &'static str = ENTITY;

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<DeployApplicationRequest>,
        response: &mut DeployApplicationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        DEPLOY.check(call)?;
        let request = envelope.basic_message;
        let name = destination(&request.deployment)?;
        response.destination_file_name = Some(name.to_owned());
        let content = envelope
            .binary_data
            .ok_or(CommandError::missing_binary("application archive"))?;

        let options = DeployOptions {
            enabled: request.enabled.unwrap_or(true),
            force: request.force_deploy.unwrap_or(true),
            server_groups: request.deployment.server_group_set(),
        };
        let result = DeploymentClient::new(call.client).deploy(name, content, &options)?;
        finish(call, &result, &mut response.resource.server_refresh_indicator);
        Ok(None)
    }
}

/// Removes a deployment, by default together with its content.
#[derive(Debug, Default, Clone, Copy)]
pub struct UndeployApplication;

impl DmrOperation for UndeployApplication {
    type Request = UndeployApplicationRequest;
    type Response = UndeployApplicationResponse;

    const OPERATION: &'static str = "Undeploy";
    const ENTITY: &'static str = ENTITY;

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<UndeployApplicationRequest>,
        response: &mut UndeployApplicationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        UNDEPLOY.check(call)?;
        let request = envelope.basic_message;
        let name = destination(&request.deployment)?;
        response.destination_file_name = Some(name.to_owned());

        let result = DeploymentClient::new(call.client).undeploy(
            name,
            &request.deployment.server_group_set(),
            request.remove_content.unwrap_or(true),
        )?;
        finish(call, &result, &mut response.resource.server_refresh_indicator);
        Ok(None)
    }
}

/// Enable, disable and restart share one shape: check, then one call per
/// target server group.
fn toggle<F>(
    action: &Action,
    call: &DmrCall<'_>,
    fields: &DeploymentFields,
    destination_file_name: &mut Option<String>,
    indicator: &mut Option<ServerRefreshIndicator>,
    run: F,
) -> Result<Option<Vec<u8>>, CommandError>
where
    F: FnOnce(&DeploymentClient<'_>, &str, &BTreeSet<String>) -> Result<OperationResult, DmrError>,
{
    action.check(call)?;
    let name = destination(fields)?;
    *destination_file_name = Some(name.to_owned());
    let result = run(
        &DeploymentClient::new(call.client),
        name,
        &fields.server_group_set(),
    )?;
    finish(call, &result, indicator);
    Ok(None)
}

/// Activates a deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnableApplication;

impl DmrOperation for EnableApplication {
    type Request = EnableApplicationRequest;
    type Response = EnableApplicationResponse;

    const OPERATION: &'static str = "Enable Deployment";
    const ENTITY: &'static str = ENTITY;

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<EnableApplicationRequest>,
        response: &mut EnableApplicationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        toggle(
            &ENABLE,
            call,
            &envelope.basic_message.deployment,
            &mut response.destination_file_name,
            &mut response.resource.server_refresh_indicator,
            |client, name, groups| client.enable(name, groups),
        )
    }
}

/// Deactivates a deployment without removing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisableApplication;

impl DmrOperation for DisableApplication {
    type Request = DisableApplicationRequest;
    type Response = DisableApplicationResponse;

    const OPERATION: &'static str = "Disable Deployment";
    const ENTITY: &'static str = ENTITY;

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<DisableApplicationRequest>,
        response: &mut DisableApplicationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        toggle(
            &DISABLE,
            call,
            &envelope.basic_message.deployment,
            &mut response.destination_file_name,
            &mut response.resource.server_refresh_indicator,
            |client, name, groups| client.disable(name, groups),
        )
    }
}

/// Redeploys a deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestartApplication;

impl DmrOperation for RestartApplication {
    type Request = RestartApplicationRequest;
    type Response = RestartApplicationResponse;

    const OPERATION: &'static str = "Restart Deployment";
    const ENTITY: &'static str = ENTITY;

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<RestartApplicationRequest>,
        response: &mut RestartApplicationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        toggle(
            &RESTART,
            call,
            &envelope.basic_message.deployment,
            &mut response.destination_file_name,
            &mut response.resource.server_refresh_indicator,
            |client, name, groups| client.restart(name, groups),
        )
    }
}
