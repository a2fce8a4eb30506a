//! Integration tests for the `hawkular-command` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn help_lists_the_gateway_option() {
    let mut command = cargo_bin_cmd!("hawkular-command");
    command.arg("--help");
    command.assert().success().stdout(contains("--gateway"));
}

#[test]
fn missing_command_exits_with_failure() {
    let mut command = cargo_bin_cmd!("hawkular-command");
    command
        .assert()
        .failure()
        .stderr(contains("--command"));
}

#[test]
fn unsupported_gateway_scheme_is_rejected() {
    let mut command = cargo_bin_cmd!("hawkular-command");
    command.args(["--gateway", "ws://127.0.0.1:8080", "--command", "EchoRequest"]);
    command
        .assert()
        .failure()
        .stderr(contains("unsupported gateway scheme"));
}
