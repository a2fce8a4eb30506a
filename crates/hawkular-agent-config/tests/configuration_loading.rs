//! Behavioural and edge-case tests for configuration loading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use hawkular_agent_config::{
    Config, ConfigError, GatewayEndpoint, LogFormat, ServerProtocol,
};

struct Harness {
    temp_dir: TempDir,
    contents: RefCell<String>,
    env: RefCell<HashMap<String, String>>,
    outcome: RefCell<Option<Result<Config, ConfigError>>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            contents: RefCell::new(String::new()),
            env: RefCell::new(HashMap::new()),
            outcome: RefCell::new(None),
        }
    }

    fn path(&self) -> Utf8PathBuf {
        let path = self.temp_dir.path().join("agent.toml");
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => panic!("non UTF-8 temp path: {}", path.display()),
        }
    }

    fn append(&self, text: &str) {
        let mut contents = self.contents.borrow_mut();
        contents.push_str(text);
        contents.push('\n');
    }

    fn load(&self) {
        let path = self.path();
        if let Err(error) = fs::write(&path, self.contents.borrow().as_str()) {
            panic!("failed to write configuration: {error}");
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => panic!("failed to read back configuration: {error}"),
        };
        let env = self.env.borrow().clone();
        let result = Config::from_toml_str(&path, &text)
            .and_then(|config| config.finish(|key| env.get(key).cloned()));
        *self.outcome.borrow_mut() = Some(result);
    }

    fn config(&self) -> Config {
        match self.outcome.borrow().as_ref() {
            Some(Ok(config)) => config.clone(),
            Some(Err(error)) => panic!("configuration failed to load: {error}"),
            None => panic!("configuration was not loaded"),
        }
    }
}

fn server_table(name: &str) -> String {
    format!("[[managed_servers]]\nname = \"{name}\"\nprotocol = \"dmr\"\nlocal = true\n")
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file containing {text}")]
fn given_file_contents(harness: &Harness, text: String) {
    harness.append(text.trim_matches('"'));
}

#[given("a configuration file declaring a local dmr server {name}")]
fn given_dmr_server(harness: &Harness, name: String) {
    harness.append(&server_table(name.trim_matches('"')));
}

#[given("the file also declares a local dmr server {name}")]
fn given_another_dmr_server(harness: &Harness, name: String) {
    harness.append(&server_table(name.trim_matches('"')));
}

#[given("the environment sets {variable} to {value}")]
fn given_env(harness: &Harness, variable: String, value: String) {
    harness
        .env
        .borrow_mut()
        .insert(variable, value.trim_matches('"').to_owned());
}

#[when("the configuration is loaded")]
fn when_loaded(harness: &Harness) {
    harness.load();
}

#[then("loading succeeds")]
fn then_succeeds(harness: &Harness) {
    let _ = harness.config();
}

#[then("loading fails mentioning {text}")]
fn then_fails(harness: &Harness, text: String) {
    let outcome = harness.outcome.borrow();
    let Some(Err(error)) = outcome.as_ref() else {
        panic!("expected configuration loading to fail");
    };
    let expected = text.trim_matches('"');
    assert!(
        error.to_string().contains(expected),
        "'{error}' does not mention '{expected}'"
    );
}

#[then("the command gateway is {endpoint}")]
fn then_gateway(harness: &Harness, endpoint: String) {
    let expected: GatewayEndpoint = match endpoint.trim_matches('"').parse() {
        Ok(endpoint) => endpoint,
        Err(error) => panic!("invalid expected endpoint: {error}"),
    };
    assert_eq!(harness.config().command_gateway(), &expected);
}

#[then("the agent is mutable")]
fn then_mutable(harness: &Harness) {
    assert!(!harness.config().is_immutable());
}

#[then("the agent is immutable")]
fn then_immutable(harness: &Harness) {
    assert!(harness.config().is_immutable());
}

#[then("there is {count} dmr managed server")]
fn then_server_count(harness: &Harness, count: usize) {
    let config = harness.config();
    assert_eq!(config.managed_servers(ServerProtocol::Dmr).count(), count);
}

#[scenario(path = "tests/features/configuration_loading.feature")]
fn configuration_loading(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[rstest]
fn missing_file_falls_back_to_defaults(harness: Harness) {
    let config = Config::load_or_default(&harness.path()).expect("defaults");
    assert_eq!(config.feed_id(), Config::default().feed_id());
}

#[rstest]
fn missing_file_is_an_error_for_strict_loading(harness: Harness) {
    let error = Config::load_from(&harness.path()).expect_err("file is absent");
    assert!(matches!(error, ConfigError::Read { .. }));
}

#[rstest]
#[case("log_format = \"compact\"", LogFormat::Compact)]
#[case("log_format = \"json\"", LogFormat::Json)]
fn reads_log_format(#[case] text: &str, #[case] expected: LogFormat) {
    let config = Config::from_toml_str(Utf8Path::new("inline.toml"), text).expect("parse");
    assert_eq!(config.log_format(), expected);
}

#[rstest]
fn rejects_unknown_keys() {
    let error = Config::from_toml_str(Utf8Path::new("inline.toml"), "colour = true").expect_err("unknown");
    assert!(matches!(error, ConfigError::Parse { .. }));
}

#[rstest]
fn rejects_bad_environment_format() {
    let error = Config::default()
        .finish(|key| (key == "HAWKULAR_AGENT_LOG_FORMAT").then(|| "xml".to_owned()))
        .expect_err("xml is not a log format");
    assert!(matches!(error, ConfigError::Override { .. }));
}

#[rstest]
fn reads_unix_gateway_and_storage_settings() {
    let text = concat!(
        "feed_id = \"edge-1\"\n",
        "jboss_home = \"/opt/wildfly\"\n",
        "command_gateway = { transport = \"unix\", path = \"/run/hawkular/agent.sock\" }\n",
        "[storage_adapter]\n",
        "url = \"http://hawkular:8080/\"\n",
        "username = \"jdoe\"\n",
        "password = \"secret\"\n",
    );
    let config = Config::from_toml_str(Utf8Path::new("inline.toml"), text).expect("parse");
    assert_eq!(config.feed_id(), "edge-1");
    assert_eq!(config.jboss_home().map(|path| path.as_str()), Some("/opt/wildfly"));
    assert_eq!(
        config.command_gateway(),
        &GatewayEndpoint::unix("/run/hawkular/agent.sock")
    );
    assert_eq!(config.storage_adapter().username.as_deref(), Some("jdoe"));
}
