//! JDBC driver commands.

use hawkular_cmdgw_api::{
    AddJdbcDriverRequest, AddJdbcDriverResponse, MessageEnvelope, RemoveJdbcDriverRequest,
    RemoveJdbcDriverResponse,
};
use hawkular_dmr_client::{Address, ModuleInstaller, ModuleSpec, OperationBuilder, execute_checked};
use tracing::info;

use super::{expect_node_type, remove_model_node};
use crate::cmd::{
    CMD_TARGET, CommandContext, CommandError, DmrCall, DmrOperation, refresh_indicator, require,
};
use crate::protocol::MonitoredEndpoint;

const ENTITY: &str = "JDBC Driver";
const JDBC_DRIVER: &str = "jdbc-driver";

const DRIVER_NAME: &str = "driver-name";
const DRIVER_MODULE_NAME: &str = "driver-module-name";
const DRIVER_CLASS_NAME: &str = "driver-class-name";
const DRIVER_MAJOR_VERSION: &str = "driver-major-version";
const DRIVER_MINOR_VERSION: &str = "driver-minor-version";
const DRIVER_XA_DATASOURCE_CLASS_NAME: &str = "driver-xa-datasource-class-name";
const JDBC_COMPLIANT: &str = "jdbc-compliant";

fn driver_address(name: &str) -> Address {
    Address::root()
        .add("subsystem", "datasources")
        .add(JDBC_DRIVER, name)
}

fn add_driver_step(name: &str, module: &str, request: &AddJdbcDriverRequest) -> OperationBuilder {
    OperationBuilder::add()
        .address(driver_address(name))
        .param(DRIVER_NAME, name)
        .param(DRIVER_MODULE_NAME, module)
        .optional_param(DRIVER_CLASS_NAME, request.driver_class.clone())
        .optional_param(DRIVER_MAJOR_VERSION, request.driver_major_version)
        .optional_param(DRIVER_MINOR_VERSION, request.driver_minor_version)
        .optional_param(
            DRIVER_XA_DATASOURCE_CLASS_NAME,
            request.driver_xa_datasource_class_name.clone(),
        )
        .optional_param(JDBC_COMPLIANT, request.jdbc_compliant)
}

/// Installs the driver jar as a module and registers the driver.
///
/// The module is written to the managed server's filesystem, so the server
/// must be local to the agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddJdbcDriver;

impl DmrOperation for AddJdbcDriver {
    type Request = AddJdbcDriverRequest;
    type Response = AddJdbcDriverResponse;

    const OPERATION: &'static str = "Add";
    const ENTITY: &'static str = ENTITY;

    fn success_message(&self, response: &AddJdbcDriverResponse) -> Option<String> {
        response
            .driver_name
            .as_deref()
            .map(|name| format!("Added JDBC Driver: {name}"))
    }

    fn validate_endpoint(
        &self,
        endpoint: &MonitoredEndpoint,
        context: &CommandContext<'_>,
    ) -> Result<(), CommandError> {
        if context.engine().local_hints().allows(endpoint) {
            Ok(())
        } else {
            Err(CommandError::non_local(Self::OPERATION, ENTITY, endpoint.name()))
        }
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<AddJdbcDriverRequest>,
        response: &mut AddJdbcDriverResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let request = &envelope.basic_message;
        let name = require(request.driver_name.as_deref(), "driverName", ENTITY)?;
        response.driver_name = Some(name.to_owned());
        let module = require(request.module_name.as_deref(), "moduleName", ENTITY)?;
        let jar_name = require(request.driver_jar_name.as_deref(), "driverJarName", ENTITY)?;
        let jar = envelope
            .binary_data
            .as_deref()
            .ok_or(CommandError::missing_binary("JDBC driver jar"))?;

        let endpoint = call.service.monitored_endpoint();
        let modules_root = call
            .context
            .engine()
            .local_hints()
            .modules_root()
            .ok_or_else(|| CommandError::ModulesRootUnknown {
                server: endpoint.name().to_owned(),
            })?;
        let module_dir =
            ModuleInstaller::new(modules_root).install(&ModuleSpec::jdbc_driver(module, jar_name), jar)?;
        info!(
            target: CMD_TARGET,
            module,
            path = %module_dir,
            "installed JDBC driver module"
        );

        let add = add_driver_step(name, module, request).into_request();
        let result = execute_checked(call.client, &add, "Add JDBC Driver")?;
        response.resource.server_refresh_indicator = Some(refresh_indicator(&result));
        call.service.discover_all();
        Ok(None)
    }
}

/// Unregisters a JDBC driver. The installed module stays on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveJdbcDriver;

impl DmrOperation for RemoveJdbcDriver {
    type Request = RemoveJdbcDriverRequest;
    type Response = RemoveJdbcDriverResponse;

    const OPERATION: &'static str = "Remove";
    const ENTITY: &'static str = ENTITY;

    fn validate_path(&self, model_node_path: &str, _request: &RemoveJdbcDriverRequest) -> Result<(), CommandError> {
        expect_node_type(model_node_path, JDBC_DRIVER, "remove JDBC driver", "JDBC driver")
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        _envelope: MessageEnvelope<RemoveJdbcDriverRequest>,
        response: &mut RemoveJdbcDriverResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let result = remove_model_node(call)?;
        response.resource.server_refresh_indicator = Some(refresh_indicator(&result));
        Ok(None)
    }
}
