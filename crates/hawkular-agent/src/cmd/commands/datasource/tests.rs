//! Unit tests for the datasource commands.

use std::collections::BTreeMap;

use hawkular_cmdgw_api::{
    AddDatasourceRequest, DatasourceFields, MessageEnvelope, RemoveDatasourceRequest,
    ResourceRequestFields, ResourceResponse, ResponseStatus, UpdateDatasourceRequest,
};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::cmd::Command;
use crate::cmd::commands::{AddDatasourceCommand, RemoveDatasourceCommand, UpdateDatasourceCommand};
use crate::cmd::test_support::{
    FEED, Harness, HarnessBuilder, closing_client, failure, steps, success,
};

const SERVER_PATH: &str = "/";
const EXAMPLE_DS: &str = "/subsystem=datasources/data-source=ExampleDS";
const EXAMPLE_XA: &str = "/subsystem=datasources/xa-data-source=ExampleXA";

fn target(path: &str) -> ResourceRequestFields {
    ResourceRequestFields {
        resource_id: Some(Harness::dmr_id(path)),
        feed_id: Some(FEED.to_owned()),
        authentication: None,
    }
}

fn properties(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[fixture]
fn h2_fields() -> DatasourceFields {
    DatasourceFields {
        datasource_name: Some("ExampleDS".to_owned()),
        jndi_name: Some("java:jboss/datasources/ExampleDS".to_owned()),
        driver_name: Some("h2".to_owned()),
        driver_class: Some("org.h2.Driver".to_owned()),
        connection_url: Some("jdbc:h2:mem:test".to_owned()),
        user_name: Some("sa".to_owned()),
        password: Some("sa".to_owned()),
        datasource_properties: properties(&[("autoReconnect", "true")]),
        ..DatasourceFields::default()
    }
}

#[rstest]
fn plain_batch_adds_datasource_then_each_property(h2_fields: DatasourceFields) {
    let batch = add_datasource_batch("ExampleDS", Flavour::Plain, &h2_fields);
    assert_eq!(
        steps(&batch),
        [
            ("add".to_owned(), EXAMPLE_DS.to_owned()),
            (
                "add".to_owned(),
                format!("{EXAMPLE_DS}/connection-properties=autoReconnect"),
            ),
        ]
    );
    let add = batch.steps().first().expect("datasource step");
    assert_eq!(add.get("statistics-enabled"), Some(&json!(true)));
    assert_eq!(add.get("connection-url"), Some(&json!("jdbc:h2:mem:test")));
    assert_eq!(add.get("xa-datasource-class"), None);
}

#[rstest]
fn add_command_reports_name_and_rediscovers(h2_fields: DatasourceFields) {
    let mut client = closing_client();
    client
        .expect_execute()
        .once()
        .withf(|request| request.operation_name() == "composite")
        .returning(|_| Ok(success(Some("reload-required"))));
    let harness = HarnessBuilder::new().client(client).build();
    let request = AddDatasourceRequest {
        resource: target(SERVER_PATH),
        xa_datasource: Some(false),
        datasource: h2_fields,
    };

    let context = harness.context();
    let answer = AddDatasourceCommand::default()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message;

    assert_eq!(answer.status(), ResponseStatus::Ok);
    assert_eq!(answer.message(), Some("Added Datasource: ExampleDS"));
    assert_eq!(answer.datasource_name.as_deref(), Some("ExampleDS"));
    assert_eq!(harness.dmr.discovery_generation(), 1);
}

#[rstest]
fn add_requires_a_name() {
    let harness = HarnessBuilder::new().client(closing_client()).build();
    let request = AddDatasourceRequest {
        resource: target(SERVER_PATH),
        ..AddDatasourceRequest::default()
    };
    let context = harness.context();
    let answer = AddDatasourceCommand::default()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message;
    assert_eq!(answer.status(), ResponseStatus::Error);
    assert!(
        answer
            .message()
            .is_some_and(|message| message.ends_with("Missing [datasourceName] in the [Datasource] request")),
        "{answer:?}"
    );
}

#[rstest]
fn update_rejects_renaming() {
    let harness = HarnessBuilder::new().build();
    let request = UpdateDatasourceRequest {
        resource: target(EXAMPLE_DS),
        datasource: DatasourceFields {
            datasource_name: Some("Renamed".to_owned()),
            ..DatasourceFields::default()
        },
    };
    let context = harness.context();
    let answer = UpdateDatasourceCommand::default()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message;
    assert!(
        answer.message().is_some_and(|message| message.ends_with(
            "Renaming a [Datasource] is not supported. Old name: [ExampleDS], new name: [Renamed]"
        )),
        "{answer:?}"
    );
    assert_eq!(harness.sessions_opened(), 0);
}

#[rstest]
fn property_sync_removes_replaces_and_adds() {
    let address = Address::parse(EXAMPLE_DS);
    let current = properties(&[("gone", "1"), ("changed", "old"), ("same", "x")]);
    let wanted = properties(&[("changed", "new"), ("same", "x"), ("fresh", "2")]);
    let sync: Vec<(String, String)> = property_sync_steps(&address, Flavour::Plain, &current, &wanted)
        .into_iter()
        .map(|step| {
            let node = step.build();
            (
                node.get("operation").and_then(|op| op.as_str()).unwrap_or_default().to_owned(),
                node.get("address")
                    .and_then(|address| address.as_array())
                    .and_then(|segments| segments.last())
                    .and_then(|segment| segment.get("connection-properties"))
                    .and_then(|key| key.as_str())
                    .unwrap_or_default()
                    .to_owned(),
            )
        })
        .collect();
    assert_eq!(
        sync,
        [
            ("remove".to_owned(), "changed".to_owned()),
            ("add".to_owned(), "changed".to_owned()),
            ("remove".to_owned(), "gone".to_owned()),
            ("add".to_owned(), "fresh".to_owned()),
        ]
    );
}

#[rstest]
fn xa_update_retries_the_batch_once() {
    let mut client = closing_client();
    let mut batches = 0;
    client.expect_execute().times(3).returning(move |request| {
        if request.operation_name() == "read-children-resources" {
            return Ok(hawkular_dmr_client::OperationResult::new(json!({
                "outcome": "success",
                "result": {"URL": {"value": "jdbc:h2:mem:old"}},
            })));
        }
        batches += 1;
        if batches == 1 {
            Ok(failure("WFLYCTL0158: Operation handler failed"))
        } else {
            Ok(success(None))
        }
    });
    let harness = HarnessBuilder::new().client(client).build();
    let request = UpdateDatasourceRequest {
        resource: target(EXAMPLE_XA),
        datasource: DatasourceFields {
            datasource_name: Some("ExampleXA".to_owned()),
            user_name: Some("admin".to_owned()),
            datasource_properties: properties(&[("URL", "jdbc:h2:mem:new")]),
            ..DatasourceFields::default()
        },
    };

    let context = harness.context();
    let answer = UpdateDatasourceCommand::default()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message;

    assert_eq!(answer.status(), ResponseStatus::Ok, "{answer:?}");
    assert!(
        answer
            .message()
            .is_some_and(|message| message.ends_with(": Updated Datasource: ExampleXA"))
    );
    assert_eq!(harness.dmr.discovery_generation(), 1);
}

#[rstest]
fn removal_checks_the_address_kind() {
    let harness = HarnessBuilder::new().build();
    let request = RemoveDatasourceRequest {
        resource: target("/subsystem=datasources/jdbc-driver=h2"),
    };
    let context = harness.context();
    let answer = RemoveDatasourceCommand::default()
        .execute(MessageEnvelope::new(request), &context)
        .expect("a response")
        .basic_message;
    assert!(
        answer.message().is_some_and(|message| message.ends_with(
            "Cannot remove datasource: [/subsystem=datasources/jdbc-driver=h2] is not a datasource address"
        )),
        "{answer:?}"
    );
}
