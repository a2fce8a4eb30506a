//! Unit tests for the deployment helper.

use std::collections::BTreeSet;

use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;

mock! {
    Client {}
    impl ModelControllerClient for Client {
        fn execute(&self, request: &OperationRequest) -> Result<OperationResult, DmrError>;
        fn close(&self) -> Result<(), DmrError>;
    }
}

fn success() -> OperationResult {
    OperationResult::new(json!({"outcome": "success"}))
}

fn step_summary(request: &OperationRequest) -> Vec<(String, String)> {
    request
        .steps()
        .iter()
        .map(|step| {
            let operation = step
                .get("operation")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let address = step
                .get("address")
                .and_then(Value::as_array)
                .map(|segments| {
                    segments
                        .iter()
                        .filter_map(Value::as_object)
                        .flat_map(|pair| pair.iter())
                        .map(|(kind, name)| format!("/{kind}={}", name.as_str().unwrap_or_default()))
                        .collect::<String>()
                })
                .unwrap_or_default();
            (operation, address)
        })
        .collect()
}

#[fixture]
fn groups() -> BTreeSet<String> {
    ["main-server-group", "other-server-group"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[rstest]
fn standalone_deploy_replaces_content_with_attachment() {
    let mut client = MockClient::new();
    client
        .expect_execute()
        .once()
        .withf(|request| {
            request.attachments() == [b"war-bytes".to_vec()]
                && step_summary(request)
                    == [("full-replace-deployment".to_owned(), String::new())]
                && request
                    .steps()
                    .first()
                    .and_then(|step| step.get("name"))
                    == Some(&json!("app.war"))
        })
        .returning(|_| Ok(success()));

    let deployments = DeploymentClient::new(&client);
    deployments
        .deploy("app.war", b"war-bytes".to_vec(), &DeployOptions::default())
        .expect("deploy");
}

#[rstest]
fn domain_deploy_maps_every_group(groups: BTreeSet<String>) {
    let mut client = MockClient::new();
    client
        .expect_execute()
        .once()
        .withf(|request| {
            step_summary(request)
                == [
                    ("add".to_owned(), "/deployment=app.war".to_owned()),
                    (
                        "add".to_owned(),
                        "/server-group=main-server-group/deployment=app.war".to_owned(),
                    ),
                    (
                        "add".to_owned(),
                        "/server-group=other-server-group/deployment=app.war".to_owned(),
                    ),
                ]
        })
        .returning(|_| Ok(success()));

    let options = DeployOptions {
        force: false,
        server_groups: groups,
        ..DeployOptions::default()
    };
    DeploymentClient::new(&client)
        .deploy("app.war", Vec::new(), &options)
        .expect("deploy");
}

#[rstest]
#[case(true, vec![("undeploy", "/deployment=app.war"), ("remove", "/deployment=app.war")])]
#[case(false, vec![("undeploy", "/deployment=app.war")])]
fn standalone_undeploy_honours_remove_content(
    #[case] remove_content: bool,
    #[case] steps: Vec<(&'static str, &'static str)>,
) {
    let expected: Vec<(String, String)> = steps
        .into_iter()
        .map(|(operation, address)| (operation.to_owned(), address.to_owned()))
        .collect();
    let mut client = MockClient::new();
    client
        .expect_execute()
        .once()
        .withf(move |request| step_summary(request) == expected)
        .returning(|_| Ok(success()));

    DeploymentClient::new(&client)
        .undeploy("app.war", &BTreeSet::new(), remove_content)
        .expect("undeploy");
}

#[rstest]
fn failed_outcome_names_the_deployment(groups: BTreeSet<String>) {
    let mut client = MockClient::new();
    client.expect_execute().once().returning(|_| {
        Ok(OperationResult::new(json!({
            "outcome": "failed",
            "failure-description": "WFLYDC0074: no such deployment",
        })))
    });

    let error = DeploymentClient::new(&client)
        .enable("app.war", &groups)
        .expect_err("enable must fail");
    assert_eq!(
        error.to_string(),
        "Could not perform operation [Enable Deployment [app.war]]: WFLYDC0074: no such deployment"
    );
}
