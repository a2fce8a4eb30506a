//! Unit tests for agent bootstrap.

use std::fs;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};

use camino::Utf8PathBuf;
use hawkular_agent_config::{GatewayEndpoint, ManagedServer};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn push(&self, event: String) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.push("starting".to_owned());
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        self.push(format!("succeeded {}", config.feed_id()));
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.push("failed".to_owned());
    }

    fn endpoint_registered(&self, endpoint: &MonitoredEndpoint) {
        self.push(format!("registered {endpoint}"));
    }

    fn gateway_listening(&self, _endpoint: &GatewayEndpoint) {
        self.push("listening".to_owned());
    }
}

struct FailingLoader;

impl ConfigLoader for FailingLoader {
    fn load(&self) -> Result<Config, Arc<ConfigError>> {
        Err(Arc::new(ConfigError::EmptyFeedId))
    }
}

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf8 path")
}

fn loopback_config() -> Config {
    let mut disabled = ManagedServer::local("Retired", ServerProtocol::Dmr);
    disabled.enabled = false;
    Config {
        feed_id: "bootstrap-feed".to_owned(),
        command_gateway: GatewayEndpoint::tcp("127.0.0.1", 0),
        managed_servers: vec![
            ManagedServer::local("Local DMR", ServerProtocol::Dmr),
            ManagedServer::local("Local JMX", ServerProtocol::Jmx),
            disabled,
        ],
        ..Config::default()
    }
}

#[rstest]
fn bootstrap_registers_enabled_servers() {
    let reporter = Arc::new(RecordingReporter::default());
    let agent = bootstrap_with(
        &StaticConfigLoader::new(loopback_config()),
        reporter.clone(),
        &DisconnectedEndpointFactory,
    )
    .expect("bootstrap");

    let protocols = agent.engine().protocols();
    assert!(protocols.contains(ServerProtocol::Dmr, "Local DMR"));
    assert!(protocols.contains(ServerProtocol::Jmx, "Local JMX"));
    assert!(!protocols.contains(ServerProtocol::Dmr, "Retired"));
    assert_eq!(
        reporter.events(),
        [
            "starting",
            "registered Local DMR[dmr]",
            "registered Local JMX[jmx]",
            "succeeded bootstrap-feed",
        ]
    );
}

#[rstest]
fn configuration_failure_is_reported() {
    let reporter = Arc::new(RecordingReporter::default());
    let result = bootstrap_with(&FailingLoader, reporter.clone(), &DisconnectedEndpointFactory);

    assert!(matches!(result, Err(BootstrapError::Configuration { .. })));
    assert_eq!(reporter.events(), ["starting", "failed"]);
}

#[rstest]
fn unusable_socket_directory_is_reported(workdir: TempDir) {
    let blocker = utf8(&workdir, "blocker");
    fs::write(&blocker, b"file").expect("write blocker");
    let config = Config {
        command_gateway: GatewayEndpoint::unix(blocker.join("run").join("agent.sock")),
        ..Config::default()
    };
    let reporter = Arc::new(RecordingReporter::default());
    let result = bootstrap_with(
        &StaticConfigLoader::new(config),
        reporter.clone(),
        &DisconnectedEndpointFactory,
    );

    assert!(matches!(result, Err(BootstrapError::Gateway { .. })));
    assert_eq!(reporter.events(), ["starting", "failed"]);
}

#[rstest]
fn file_loader_applies_the_log_filter_override(workdir: TempDir) {
    let path = utf8(&workdir, "agent.toml");
    fs::write(&path, "feed_id = \"from-file\"\nlog_filter = \"warn\"\n").expect("write config");

    let config = FileConfigLoader::new(Some(path))
        .with_log_filter(Some("debug".to_owned()))
        .load()
        .expect("load");
    assert_eq!(config.feed_id(), "from-file");
    assert_eq!(config.log_filter(), "debug");
}

#[rstest]
fn explicit_config_path_must_exist(workdir: TempDir) {
    let error = FileConfigLoader::new(Some(utf8(&workdir, "missing.toml")))
        .load()
        .expect_err("missing file");
    assert!(matches!(*error, ConfigError::Read { .. }));
}

#[rstest]
fn served_gateway_answers_echo() {
    let reporter = Arc::new(RecordingReporter::default());
    let agent = bootstrap_with(
        &StaticConfigLoader::new(loopback_config()),
        reporter.clone(),
        &DisconnectedEndpointFactory,
    )
    .expect("bootstrap");
    let handle = agent.serve().expect("serve");
    let addr = handle.local_addr().expect("tcp address");

    let mut client = TcpStream::connect(addr).expect("connect");
    client
        .write_all(br#"EchoRequest={"echoMessage":"up"}"#)
        .expect("write request");
    client.shutdown(Shutdown::Write).expect("half close");
    let mut reply = String::new();
    client.read_to_string(&mut reply).expect("read reply");

    assert!(reply.starts_with("EchoResponse="), "{reply}");
    assert!(reply.contains("ECHO [up]"), "{reply}");
    assert_eq!(reporter.events().last().map(String::as_str), Some("listening"));
    handle.shutdown();
    handle.join().expect("join listener");
}
