//! Datasource commands.

use std::collections::{BTreeMap, BTreeSet};

use hawkular_cmdgw_api::{
    AddDatasourceRequest, AddDatasourceResponse, DatasourceFields, MessageEnvelope,
    RemoveDatasourceRequest, RemoveDatasourceResponse, UpdateDatasourceRequest,
    UpdateDatasourceResponse,
};
use hawkular_dmr_client::{
    Address, CompositeBuilder, DmrError, ModelControllerClient, OperationBuilder,
    OperationRequest, execute_checked,
};
use serde_json::Value;
use tracing::trace;

use super::remove_model_node;
use crate::cmd::{
    CMD_TARGET, CommandError, DmrCall, DmrOperation, RetryPolicy, refresh_indicator, require,
};

const ENTITY: &str = "Datasource";
const SUBSYSTEM: &str = "subsystem";
const DATASOURCES: &str = "datasources";
const DATA_SOURCE: &str = "data-source";
const XA_DATA_SOURCE: &str = "xa-data-source";
const CONNECTION_PROPERTIES: &str = "connection-properties";
const XA_DATASOURCE_PROPERTIES: &str = "xa-datasource-properties";
const VALUE: &str = "value";

const JNDI_NAME: &str = "jndi-name";
const DRIVER_NAME: &str = "driver-name";
const DRIVER_CLASS: &str = "driver-class";
const XA_DATASOURCE_CLASS: &str = "xa-datasource-class";
const CONNECTION_URL: &str = "connection-url";
const USER_NAME: &str = "user-name";
const PASSWORD: &str = "password";
const STATISTICS_ENABLED: &str = "statistics-enabled";

/// Datasource flavour, decided by the address node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    Plain,
    Xa,
}

impl Flavour {
    const fn node_type(self) -> &'static str {
        match self {
            Self::Plain => DATA_SOURCE,
            Self::Xa => XA_DATA_SOURCE,
        }
    }

    const fn property_type(self) -> &'static str {
        match self {
            Self::Plain => CONNECTION_PROPERTIES,
            Self::Xa => XA_DATASOURCE_PROPERTIES,
        }
    }

    fn of(address: &Address) -> Option<Self> {
        match address.last() {
            Some((DATA_SOURCE, _)) => Some(Self::Plain),
            Some((XA_DATA_SOURCE, _)) => Some(Self::Xa),
            _ => None,
        }
    }
}

fn datasource_address(flavour: Flavour, name: &str) -> Address {
    Address::root()
        .add(SUBSYSTEM, DATASOURCES)
        .add(flavour.node_type(), name)
}

fn property_step(parent: &Address, flavour: Flavour, key: &str, value: &str) -> OperationBuilder {
    OperationBuilder::add()
        .address(parent.clone().add(flavour.property_type(), key))
        .param(VALUE, value)
}

/// The composite that creates datasource `name` with its properties.
fn add_datasource_batch(name: &str, flavour: Flavour, fields: &DatasourceFields) -> OperationRequest {
    let address = datasource_address(flavour, name);
    let add = match flavour {
        Flavour::Xa => OperationBuilder::add()
            .param(JNDI_NAME, fields.jndi_name.clone())
            .param(DRIVER_NAME, fields.driver_name.clone())
            .param(XA_DATASOURCE_CLASS, fields.xa_data_source_class.clone()),
        Flavour::Plain => OperationBuilder::add()
            .param(JNDI_NAME, fields.jndi_name.clone())
            .param(DRIVER_NAME, fields.driver_name.clone())
            .param(DRIVER_CLASS, fields.driver_class.clone())
            .param(CONNECTION_URL, fields.connection_url.clone()),
    }
    .param(USER_NAME, fields.user_name.clone())
    .param(PASSWORD, fields.password.clone())
    .param(STATISTICS_ENABLED, true)
    .address(address.clone());

    CompositeBuilder::new()
        .step(add)
        .steps(
            fields
                .datasource_properties
                .iter()
                .map(|(key, value)| property_step(&address, flavour, key, value)),
        )
        .build()
}

/// Creates a datasource.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddDatasource;

impl DmrOperation for AddDatasource {
    type Request = AddDatasourceRequest;
    type Response = AddDatasourceResponse;

    const OPERATION: &'static str = "Add";
    const ENTITY: &'static str = ENTITY;

    fn success_message(&self, response: &AddDatasourceResponse) -> Option<String> {
        response
            .datasource_name
            .as_deref()
            .map(|name| format!("Added Datasource: {name}"))
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<AddDatasourceRequest>,
        response: &mut AddDatasourceResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let request = envelope.basic_message;
        let name = require(
            request.datasource.datasource_name.as_deref(),
            "datasourceName",
            ENTITY,
        )?;
        response.datasource_name = Some(name.to_owned());

        let flavour = if request.xa_datasource.unwrap_or(false) {
            Flavour::Xa
        } else {
            Flavour::Plain
        };
        let batch = add_datasource_batch(name, flavour, &request.datasource);
        let result = execute_checked(call.client, &batch, "Add Datasource")?;

        response.resource.server_refresh_indicator = Some(refresh_indicator(&result));
        call.service.discover_all();
        Ok(None)
    }
}

/// Changes an existing datasource in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateDatasource;

impl UpdateDatasource {
    /// One `write-attribute` per member present in the request.
    fn attribute_steps(address: &Address, flavour: Flavour, fields: &DatasourceFields) -> Vec<OperationBuilder> {
        let mut attributes = vec![(JNDI_NAME, &fields.jndi_name), (DRIVER_NAME, &fields.driver_name)];
        match flavour {
            Flavour::Xa => attributes.push((XA_DATASOURCE_CLASS, &fields.xa_data_source_class)),
            Flavour::Plain => {
                attributes.push((DRIVER_CLASS, &fields.driver_class));
                attributes.push((CONNECTION_URL, &fields.connection_url));
            }
        }
        attributes.push((USER_NAME, &fields.user_name));
        attributes.push((PASSWORD, &fields.password));
        attributes
            .into_iter()
            .filter_map(|(attribute, value)| {
                value.as_deref().map(|present| {
                    OperationBuilder::write_attribute(attribute, present).address(address.clone())
                })
            })
            .collect()
    }
}

/// Reads the current properties of the datasource at `address`.
fn current_properties(
    client: &dyn ModelControllerClient,
    address: &Address,
    flavour: Flavour,
) -> Result<BTreeMap<String, String>, DmrError> {
    let request = OperationBuilder::read_children_resources(flavour.property_type())
        .address(address.clone())
        .into_request();
    let result = execute_checked(client, &request, "Read datasource properties")?;
    let properties = match result.result() {
        Some(Value::Object(children)) => children
            .iter()
            .map(|(key, node)| {
                let value = match node.get(VALUE) {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect(),
        Some(Value::Null) | None => BTreeMap::new(),
        Some(other) => {
            return Err(DmrError::unexpected_result(
                "Read datasource properties",
                format!("expected an object of children, got {other}"),
            ));
        }
    };
    Ok(properties)
}

/// Steps that turn `current` into `wanted`.
///
/// A changed property is removed and added again; the server cannot modify
/// a property value in place.
fn property_sync_steps(
    address: &Address,
    flavour: Flavour,
    current: &BTreeMap<String, String>,
    wanted: &BTreeMap<String, String>,
) -> Vec<OperationBuilder> {
    let mut steps = Vec::new();
    let mut kept = BTreeSet::new();
    for (key, existing) in current {
        let property = address.clone().add(flavour.property_type(), key.as_str());
        match wanted.get(key) {
            None => steps.push(OperationBuilder::remove().address(property)),
            Some(value) if value != existing => {
                trace!(target: CMD_TARGET, property = %key, "replacing datasource property");
                steps.push(OperationBuilder::remove().address(property));
                steps.push(property_step(address, flavour, key, value));
                kept.insert(key.as_str());
            }
            Some(_) => {
                kept.insert(key.as_str());
            }
        }
    }
    steps.extend(
        wanted
            .iter()
            .filter(|(key, _)| !kept.contains(key.as_str()))
            .map(|(key, value)| property_step(address, flavour, key, value)),
    );
    steps
}

impl DmrOperation for UpdateDatasource {
    type Request = UpdateDatasourceRequest;
    type Response = UpdateDatasourceResponse;

    const OPERATION: &'static str = "Update";
    const ENTITY: &'static str = ENTITY;

    fn validate_path(&self, model_node_path: &str, request: &UpdateDatasourceRequest) -> Result<(), CommandError> {
        let address = Address::parse(model_node_path);
        if Flavour::of(&address).is_none() {
            return Err(CommandError::unexpected_address(
                "update datasource",
                model_node_path,
                "datasource",
            ));
        }
        let current = address.last().map(|(_, name)| name).unwrap_or_default();
        let wanted = request.datasource.datasource_name.as_deref().unwrap_or_default();
        if current != wanted {
            return Err(CommandError::rename(current, wanted));
        }
        Ok(())
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        envelope: MessageEnvelope<UpdateDatasourceRequest>,
        response: &mut UpdateDatasourceResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let request = envelope.basic_message;
        let address = Address::parse(call.model_node_path);
        let flavour = Flavour::of(&address).ok_or_else(|| {
            CommandError::unexpected_address("update datasource", call.model_node_path, "datasource")
        })?;
        let name = address.last().map(|(_, name)| name.to_owned()).unwrap_or_default();
        response.datasource_name = Some(name.clone());

        let current = current_properties(call.client, &address, flavour)?;
        let batch = CompositeBuilder::new()
            .steps(Self::attribute_steps(&address, flavour, &request.datasource))
            .steps(property_sync_steps(
                &address,
                flavour,
                &current,
                &request.datasource.datasource_properties,
            ));
        let policy = match flavour {
            Flavour::Xa => RetryPolicy::MODEL_NODE_CHANGE,
            Flavour::Plain => RetryPolicy::ONCE,
        };
        let result = if batch.is_empty() {
            None
        } else {
            let update = batch.build();
            Some(policy.run("update datasource properties", || {
                execute_checked(call.client, &update, "Update Datasource")
            })?)
        };

        response.resource.server_refresh_indicator =
            Some(result.as_ref().map(refresh_indicator).unwrap_or_default());
        response.resource.message = Some(format!("Updated Datasource: {name}"));
        call.service.discover_all();
        Ok(None)
    }
}

/// Removes a datasource.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveDatasource;

impl DmrOperation for RemoveDatasource {
    type Request = RemoveDatasourceRequest;
    type Response = RemoveDatasourceResponse;

    const OPERATION: &'static str = "Remove";
    const ENTITY: &'static str = ENTITY;

    fn validate_path(&self, model_node_path: &str, _request: &RemoveDatasourceRequest) -> Result<(), CommandError> {
        Flavour::of(&Address::parse(model_node_path))
            .map(|_| ())
            .ok_or_else(|| CommandError::unexpected_address("remove datasource", model_node_path, "datasource"))
    }

    fn execute(
        &self,
        call: &DmrCall<'_>,
        _envelope: MessageEnvelope<RemoveDatasourceRequest>,
        response: &mut RemoveDatasourceResponse,
    ) -> Result<Option<Vec<u8>>, CommandError> {
        let result = remove_model_node(call)?;
        response.resource.server_refresh_indicator = Some(refresh_indicator(&result));
        Ok(None)
    }
}

#[cfg(test)]
mod tests;
