//! The concrete commands the agent answers.
//!
//! Each DMR command is a [`DmrOperation`](super::DmrOperation) wrapped in a
//! [`DmrResourcePathCommand`]; the aliases below name the wrapped forms that
//! the gateway registers.

mod datasource;
mod deployment;
mod echo;
mod execute_operation;
mod generic_error;
mod jdbc_driver;

pub use datasource::{AddDatasource, RemoveDatasource, UpdateDatasource};
pub use deployment::{
    DeployApplication, DisableApplication, EnableApplication, RestartApplication,
    UndeployApplication,
};
pub use echo::EchoCommand;
pub use execute_operation::{DmrExecuteOperation, JmxExecuteOperation};
pub use generic_error::GenericErrorCommand;
pub use jdbc_driver::{AddJdbcDriver, RemoveJdbcDriver};

use hawkular_cmdgw_api::ExecuteOperationRequest;
use hawkular_dmr_client::{Address, OperationBuilder, OperationResult, execute_checked};

use super::{
    AgnosticCommand, CommandError, DmrCall, DmrResourcePathCommand, JmxResourcePathCommand,
    RetryPolicy,
};

/// `AddDatasourceRequest`.
pub type AddDatasourceCommand = DmrResourcePathCommand<AddDatasource>;
/// `UpdateDatasourceRequest`.
pub type UpdateDatasourceCommand = DmrResourcePathCommand<UpdateDatasource>;
/// `RemoveDatasourceRequest`.
pub type RemoveDatasourceCommand = DmrResourcePathCommand<RemoveDatasource>;
/// `AddJdbcDriverRequest`.
pub type AddJdbcDriverCommand = DmrResourcePathCommand<AddJdbcDriver>;
/// `RemoveJdbcDriverRequest`.
pub type RemoveJdbcDriverCommand = DmrResourcePathCommand<RemoveJdbcDriver>;
/// `DeployApplicationRequest`.
pub type DeployApplicationCommand = DmrResourcePathCommand<DeployApplication>;
/// `UndeployApplicationRequest`.
pub type UndeployApplicationCommand = DmrResourcePathCommand<UndeployApplication>;
/// `EnableApplicationRequest`.
pub type EnableApplicationCommand = DmrResourcePathCommand<EnableApplication>;
/// `DisableApplicationRequest`.
pub type DisableApplicationCommand = DmrResourcePathCommand<DisableApplication>;
/// `RestartApplicationRequest`.
pub type RestartApplicationCommand = DmrResourcePathCommand<RestartApplication>;

/// `ExecuteOperationRequest`, routed to the DMR or JMX variant.
pub type ExecuteOperationCommand = AgnosticCommand<
    DmrResourcePathCommand<DmrExecuteOperation>,
    JmxResourcePathCommand<JmxExecuteOperation>,
>;

const EXECUTE_OPERATION_ENTITY: &str = "Resource";

impl ExecuteOperationCommand {
    /// The agnostic Execute Operation command.
    #[must_use]
    pub const fn execute_operation() -> Self {
        Self::new(
            EXECUTE_OPERATION_ENTITY,
            requested_operation,
            DmrResourcePathCommand::new(DmrExecuteOperation),
            JmxResourcePathCommand::new(JmxExecuteOperation),
        )
    }
}

fn requested_operation(request: &ExecuteOperationRequest) -> String {
    request.operation_name.clone().unwrap_or_default()
}

/// Removes the model node of `call` and drops it from inventory.
///
/// A removal the server rejects is attempted once more.
pub(crate) fn remove_model_node(call: &DmrCall<'_>) -> Result<OperationResult, CommandError> {
    let address = Address::parse(call.model_node_path);
    let request = OperationBuilder::remove()
        .address(address.clone())
        .into_request();
    let result = RetryPolicy::MODEL_NODE_CHANGE.run(
        &format!("remove [{}]", call.model_node_path),
        || execute_checked(call.client, &request, "Remove"),
    )?;
    call.service.remove_resources(&address);
    call.service.discover_all();
    Ok(result)
}

/// Checks that the last segment of `model_node_path` has type `node_type`.
pub(crate) fn expect_node_type(
    model_node_path: &str,
    node_type: &str,
    action: &'static str,
    expected: &'static str,
) -> Result<(), CommandError> {
    match Address::parse(model_node_path).last() {
        Some((kind, _)) if kind == node_type => Ok(()),
        _ => Err(CommandError::unexpected_address(action, model_node_path, expected)),
    }
}

