//! Invocation of operations declared by a resource's type.
//!
//! Whether an operation mutates the server is only known once it is found in
//! the resource type, so both variants pass the base's immutability check
//! and repeat it after the lookup.

use hawkular_cmdgw_api::{ExecuteOperationRequest, ExecuteOperationResponse, MessageEnvelope};
use hawkular_dmr_client::{OperationBuilder, execute_checked};
use tracing::{debug, trace};

use crate::cmd::{
    CMD_TARGET, CommandContext, CommandError, DmrCall, DmrOperation, JmxCall, JmxOperation,
    refresh_indicator,
};
use crate::inventory::{NodeLocation, OperationDefinition, Resource};
use crate::params::{ParamValue, build_arguments};

const OPERATION: &str = "Execute Operation";
const UNKNOWN_RESOURCE_ACTION: &str = "execute operation";

/// Finds `requested` on `resource` and applies the late immutability check.
fn resolve_operation<'r, L: NodeLocation>(
    resource: &'r Resource<L>,
    requested: &str,
    context: &CommandContext<'_>,
) -> Result<&'r OperationDefinition<L>, CommandError> {
    trace!(
        target: CMD_TARGET,
        operation = requested,
        resource = %resource.id,
        "searching declared operations"
    );
    let operation = resource
        .resource_type
        .find_operation(requested)
        .ok_or_else(|| CommandError::unknown_operation(requested, resource))?;
    if operation.modifies && context.engine().is_immutable() {
        return Err(CommandError::operation_immutable(requested));
    }
    Ok(operation)
}

fn requested_name(request: &ExecuteOperationRequest) -> &str {
    request.operation_name.as_deref().unwrap_or_default()
}

/// Execute Operation against a DMR server.
///
/// Declared parameters are coerced to their declared types; any other
/// request parameter is passed through as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct DmrExecuteOperation;

impl DmrOperation for DmrExecuteOperation {
    type Request = ExecuteOperationRequest;
    type Response = ExecuteOperationResponse;

    const OPERATION: &'static str = OPERATION;
    const ENTITY: &'static str = "DMR Node";

    fn operation_name(&self, request: &ExecuteOperationRequest) -> String {
        requested_name(request).to_owned()
    }

    fn modifies_resource(&self) -> bool {
        false
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<ExecuteOperationRequest>,
        response: &mut ExecuteOperationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let request = envelope.basic_message;
        let requested = requested_name(&request);
        let resource = call
            .service
            .resource_manager()
            .get_resource(call.resource_id)
            .ok_or_else(|| {
                CommandError::unknown_resource(UNKNOWN_RESOURCE_ACTION, call.resource_path)
            })?;
        let operation = resolve_operation(&resource, requested, call.context)?;
        response.operation_name = Some(requested.to_owned());

        let arguments = build_arguments(&operation.params, |name| {
            request.parameters.get(name).map(String::as_str)
        })?;
        let mut builder = OperationBuilder::by_name(operation.internal_name.as_str())
            .address(resource.location.absolutize(operation.location.as_ref()));
        for (param, value) in operation.params.iter().zip(&arguments.values) {
            if !matches!(value, ParamValue::Null) {
                builder = builder.param(&param.name, value.to_json());
            }
        }
        for (name, value) in &request.parameters {
            if !operation.params.iter().any(|param| &param.name == name) {
                builder = builder.param(name, value.as_str());
            }
        }

        let result = execute_checked(call.client, &builder.into_request(), requested)?;
        response.resource.server_refresh_indicator = Some(refresh_indicator(&result));
        call.service.discover_all();
        Ok(None)
    }
}

/// Execute Operation against a JMX server.
///
/// The session is held while the operation is resolved and invoked and is
/// closed before rediscovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct JmxExecuteOperation;

impl JmxOperation for JmxExecuteOperation {
    type Request = ExecuteOperationRequest;
    type Response = ExecuteOperationResponse;

    const OPERATION: &'static str = OPERATION;
    const ENTITY: &'static str = "JMX MBean";

    fn operation_name(&self, request: &ExecuteOperationRequest) -> String {
        requested_name(request).to_owned()
    }

    fn modifies_resource(&self) -> bool {
        false
    }

    fn execute(
        &self,
        call: &JmxCall<'_>,
        envelope: MessageEnvelope<ExecuteOperationRequest>,
        response: &mut ExecuteOperationResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let request = envelope.basic_message;
        let requested = requested_name(&request);
        let resource = call
            .service
            .resource_manager()
            .get_resource(call.resource_id)
            .ok_or_else(|| {
                CommandError::unknown_resource(UNKNOWN_RESOURCE_ACTION, call.resource_path)
            })?;

        {
            let session = call.open_session()?;
            let operation = resolve_operation(&resource, requested, call.context)?;
            let target = resource.location.absolutize(operation.location.as_ref());
            response.operation_name = Some(requested.to_owned());

            let arguments = build_arguments(&operation.params, |name| {
                request.parameters.get(name).map(String::as_str)
            })?;
            let outcome = session.connection().invoke(
                &target,
                &operation.internal_name,
                &arguments.values,
                &arguments.signature,
            )?;
            debug!(
                target: CMD_TARGET,
                mbean = %target,
                operation = %operation.internal_name,
                "invoked MBean operation"
            );
            if let Some(value) = outcome {
                response.resource.message = Some(value.to_string());
            }
        }

        call.service.discover_all();
        Ok(None)
    }
}

#[cfg(test)]
mod tests;
