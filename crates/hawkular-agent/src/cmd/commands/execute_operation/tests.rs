//! Unit tests for Execute Operation and its protocol dispatch.

use std::collections::BTreeMap;

use hawkular_cmdgw_api::{
    ExecuteOperationRequest, ExecuteOperationResponse, MessageEnvelope, ResourceRequestFields,
    ResourceResponse, ResponseStatus,
};
use hawkular_dmr_client::Address;
use rstest::rstest;
use serde_json::json;

use crate::cmd::commands::ExecuteOperationCommand;
use crate::cmd::test_support::{
    FEED, Harness, HarnessBuilder, MockConnection, closing_client, success,
};
use crate::cmd::{Command, ProtocolDelegate};
use crate::inventory::{OperationDefinition, OperationParam, ResourceType};
use crate::params::ParamValue;
use crate::protocol::ObjectName;

const SERVER: &str = "/";
const MEMORY: &str = "java.lang:type=Memory";

fn request(resource_id: String, operation: &str, parameters: &[(&str, &str)]) -> ExecuteOperationRequest {
    ExecuteOperationRequest {
        resource: ResourceRequestFields {
            resource_id: Some(resource_id),
            feed_id: Some(FEED.to_owned()),
            authentication: None,
        },
        operation_name: Some(operation.to_owned()),
        parameters: parameters
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn server_type() -> ResourceType<Address> {
    ResourceType::new("WildFly Server")
        .operation(
            OperationDefinition::new("Shutdown", "shutdown")
                .modifying()
                .param(OperationParam::new("timeout", Some("int")))
                .param(OperationParam::new("restart", Some("boolean")).with_default("false")),
        )
        .operation(OperationDefinition::new("Read JDR", "read-jdr").at(Address::parse("/subsystem=jdr")))
}

fn execute(harness: &Harness, request: ExecuteOperationRequest) -> ExecuteOperationResponse {
    let context = harness.context();
    ExecuteOperationCommand::execute_operation()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message
}

#[rstest]
fn dmr_operation_coerces_declared_parameters() {
    let mut client = closing_client();
    client
        .expect_execute()
        .once()
        .withf(|request| {
            request.model()
                == &json!({
                    "operation": "shutdown",
                    "address": [],
                    "timeout": 30,
                    "restart": false,
                    "extra": "kept",
                })
        })
        .returning(|_| Ok(success(None)));
    let harness = HarnessBuilder::new().client(client).build();
    harness.add_dmr_resource(SERVER, server_type());

    let answer = execute(
        &harness,
        request(Harness::dmr_id(SERVER), "Shutdown", &[("timeout", "30"), ("extra", "kept")]),
    );
    assert_eq!(answer.status(), ResponseStatus::Ok, "{answer:?}");
    assert_eq!(answer.operation_name.as_deref(), Some("Shutdown"));
    assert!(
        answer
            .message()
            .is_some_and(|message| message.starts_with("Performed [Shutdown] on a [DMR Node]"))
    );
    assert_eq!(harness.dmr.discovery_generation(), 1);
}

#[rstest]
fn operation_location_extends_the_resource_address() {
    let mut client = closing_client();
    client
        .expect_execute()
        .once()
        .withf(|request| request.model().get("address") == Some(&json!([{"subsystem": "jdr"}])))
        .returning(|_| Ok(success(None)));
    let harness = HarnessBuilder::new().client(client).build();
    harness.add_dmr_resource(SERVER, server_type());

    let answer = execute(&harness, request(Harness::dmr_id(SERVER), "Read JDR", &[]));
    assert_eq!(answer.status(), ResponseStatus::Ok, "{answer:?}");
}

#[rstest]
fn unknown_operation_names_the_resource() {
    let mut client = closing_client();
    client.expect_execute().times(0);
    let harness = HarnessBuilder::new().client(client).build();
    harness.add_dmr_resource(SERVER, server_type());

    let answer = execute(&harness, request(Harness::dmr_id(SERVER), "Explode", &[]));
    assert_eq!(answer.status(), ResponseStatus::Error);
    assert!(
        answer.message().is_some_and(|message| message.contains(
            "Cannot execute operation: unknown operation [Explode] for resource [Resource[id="
        )),
        "{answer:?}"
    );
}

#[rstest]
fn mutating_operation_is_rejected_late_when_immutable() {
    let mut client = closing_client();
    client.expect_execute().times(0);
    let harness = HarnessBuilder::new().client(client).immutable().build();
    harness.add_dmr_resource(SERVER, server_type());

    let answer = execute(&harness, request(Harness::dmr_id(SERVER), "Shutdown", &[]));
    assert!(
        answer
            .message()
            .is_some_and(|message| message.ends_with("Operation [Shutdown] not allowed because the agent is immutable")),
        "{answer:?}"
    );
    assert_eq!(harness.sessions_opened(), 1);
}

#[rstest]
fn unsupported_parameter_type_fails_loudly() {
    let mut client = closing_client();
    client.expect_execute().times(0);
    let harness = HarnessBuilder::new().client(client).build();
    harness.add_dmr_resource(
        SERVER,
        ResourceType::new("WildFly Server").operation(
            OperationDefinition::new("Tune", "tune").param(OperationParam::new("ratio", Some("BigDecimal"))),
        ),
    );

    let answer = execute(&harness, request(Harness::dmr_id(SERVER), "Tune", &[("ratio", "1.5")]));
    assert!(
        answer
            .message()
            .is_some_and(|message| message.ends_with("Cannot support operation with param type of [BigDecimal]")),
        "{answer:?}"
    );
}

#[rstest]
fn jmx_operation_reports_its_result() {
    let mut connection = MockConnection::new();
    connection
        .expect_invoke()
        .once()
        .withf(|target, operation, arguments, signature| {
            target == &ObjectName::new(MEMORY)
                && operation == "gc"
                && arguments == [ParamValue::Bool(true)]
                && signature == ["boolean"]
        })
        .returning(|_, _, _, _| Ok(Some(ParamValue::String("collected".to_owned()))));
    connection.expect_close().once().returning(|| Ok(()));
    let harness = HarnessBuilder::new().connection(connection).build();
    harness.add_jmx_resource(
        MEMORY,
        ResourceType::new("Memory").operation(
            OperationDefinition::new("Run GC", "gc").param(OperationParam::new("full", Some("boolean"))),
        ),
    );

    let answer = execute(&harness, request(Harness::jmx_id(MEMORY), "Run GC", &[("full", "TRUE")]));
    assert_eq!(answer.status(), ResponseStatus::Ok, "{answer:?}");
    assert!(
        answer.message().is_some_and(|message| message.starts_with("Performed [Run GC] on a [JMX MBean]")
            && message.ends_with(": collected")),
        "{answer:?}"
    );
    assert_eq!(harness.jmx.discovery_generation(), 1);
}

#[rstest]
#[case(Harness::dmr_id(SERVER), Some(ProtocolDelegate::Dmr))]
#[case(Harness::jmx_id(MEMORY), Some(ProtocolDelegate::Jmx))]
#[case(format!("{FEED}~Elsewhere~{MEMORY}"), None)]
fn agnostic_dispatch_probes_dmr_then_jmx(#[case] resource_id: String, #[case] expected: Option<ProtocolDelegate>) {
    let harness = HarnessBuilder::new().build();
    let command = ExecuteOperationCommand::execute_operation();
    let context = harness.context();
    let chosen = command.select(&request(resource_id, "Run GC", &[]), &context);
    assert_eq!(chosen.ok(), expected);
}

#[rstest]
fn agnostic_unknown_server_is_a_structured_error() {
    let harness = HarnessBuilder::new().build();
    let raw = format!("{FEED}~Elsewhere~{MEMORY}");
    let answer = execute(&harness, request(raw.clone(), "Run GC", &[]));
    assert_eq!(answer.status(), ResponseStatus::Error);
    assert!(
        answer.message().is_some_and(|message| message.starts_with(&format!(
            "Could not perform [Run GC] on a [Resource] given by Inventory path [{raw}]"
        )) && message.ends_with("unknown managed server [Elsewhere]")),
        "{answer:?}"
    );
    assert_eq!(harness.sessions_opened(), 0);
}
