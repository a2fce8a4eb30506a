//! Configuration model shared by the Hawkular agent and its command CLI.
//!
//! Configuration is read from a TOML file and then adjusted by a small set of
//! `HAWKULAR_AGENT_*` environment variables. Every field has a default so an
//! empty file (or no file at all, via [`Config::load_or_default`]) yields a
//! usable agent that listens on the local command gateway and manages no
//! servers.

mod logging;
mod servers;
mod socket;
mod storage;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use logging::{DEFAULT_LOG_FILTER, LogFormat, LogFormatParseError};
pub use servers::{ManagedServer, ServerProtocol};
pub use socket::{
    DEFAULT_GATEWAY_PORT, GatewayEndpoint, GatewayParseError, GatewayPreparationError,
};
pub use storage::StorageAdapter;

/// Environment variable overriding [`Config::log_filter`].
pub const ENV_LOG_FILTER: &str = "HAWKULAR_AGENT_LOG_FILTER";
/// Environment variable overriding [`Config::log_format`].
pub const ENV_LOG_FORMAT: &str = "HAWKULAR_AGENT_LOG_FORMAT";
/// Environment variable overriding [`Config::is_immutable`].
pub const ENV_IMMUTABLE: &str = "HAWKULAR_AGENT_IMMUTABLE";
/// Environment variable overriding [`Config::command_gateway`].
pub const ENV_GATEWAY: &str = "HAWKULAR_AGENT_GATEWAY";

const DEFAULT_FEED_ID: &str = "hawkular-agent";

/// Resolved agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Feed identifier reported with every resource.
    pub feed_id: String,
    /// Rejects every mutating command when set.
    pub immutable: bool,
    /// `tracing` filter expression.
    #[serde(default = "logging::default_log_filter")]
    pub log_filter: String,
    /// Telemetry output encoding.
    pub log_format: LogFormat,
    /// Local endpoint that accepts command-gateway connections.
    pub command_gateway: GatewayEndpoint,
    /// Remote storage adapter settings.
    pub storage_adapter: StorageAdapter,
    /// Installation directory of the managed application server.
    pub jboss_home: Option<Utf8PathBuf>,
    /// Servers the agent manages.
    pub managed_servers: Vec<ManagedServer>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_id: DEFAULT_FEED_ID.to_owned(),
            immutable: false,
            log_filter: logging::default_log_filter(),
            log_format: LogFormat::default(),
            command_gateway: GatewayEndpoint::default(),
            storage_adapter: StorageAdapter::default(),
            jboss_home: None,
            managed_servers: Vec::new(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    /// The configuration file is not valid TOML for [`Config`].
    #[error("failed to parse configuration '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
    /// An environment override could not be interpreted.
    #[error("invalid value '{value}' for {variable}: {message}")]
    Override {
        variable: &'static str,
        value: String,
        message: String,
    },
    /// The feed identifier is blank.
    #[error("feed_id must not be empty")]
    EmptyFeedId,
    /// Two managed servers of the same protocol share a name.
    #[error("duplicate {protocol} managed server '{name}'")]
    DuplicateServer {
        protocol: ServerProtocol,
        name: String,
    },
}

impl Config {
    /// Loads configuration from `path`, then applies process environment
    /// overrides and validates the result.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        let config = Self::from_toml_str(path, &text)?;
        config.finish(|key| std::env::var(key).ok())
    }

    /// Like [`Config::load_from`] but falls back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Self::default().finish(|key| std::env::var(key).ok())
        }
    }

    /// Parses TOML text. `origin` is only used for error messages.
    pub fn from_toml_str(origin: &Utf8Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Applies overrides from `lookup` and validates.
    ///
    /// `lookup` maps an environment variable name to its value. Tests pass a
    /// closure over a fixed table instead of mutating the process environment.
    pub fn finish<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            self.log_filter = filter;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log_format = value.parse().map_err(|error: LogFormatParseError| {
                ConfigError::Override {
                    variable: ENV_LOG_FORMAT,
                    message: error.to_string(),
                    value,
                }
            })?;
        }
        if let Some(value) = lookup(ENV_IMMUTABLE) {
            self.immutable = parse_flag(&value).ok_or_else(|| ConfigError::Override {
                variable: ENV_IMMUTABLE,
                message: "expected true or false".to_owned(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_GATEWAY) {
            self.command_gateway =
                value
                    .parse()
                    .map_err(|error: GatewayParseError| ConfigError::Override {
                        variable: ENV_GATEWAY,
                        message: error.to_string(),
                        value: value.clone(),
                    })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_id.trim().is_empty() {
            return Err(ConfigError::EmptyFeedId);
        }
        let mut seen = HashSet::new();
        for server in &self.managed_servers {
            if !seen.insert((server.protocol, server.name.as_str())) {
                return Err(ConfigError::DuplicateServer {
                    protocol: server.protocol,
                    name: server.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Feed identifier.
    #[must_use]
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Whether mutating commands are rejected.
    #[must_use]
    pub const fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Telemetry output encoding.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Command-gateway endpoint.
    #[must_use]
    pub const fn command_gateway(&self) -> &GatewayEndpoint {
        &self.command_gateway
    }

    /// Storage adapter settings.
    #[must_use]
    pub const fn storage_adapter(&self) -> &StorageAdapter {
        &self.storage_adapter
    }

    /// Configured application-server home, if any.
    #[must_use]
    pub fn jboss_home(&self) -> Option<&Utf8Path> {
        self.jboss_home.as_deref()
    }

    /// Enabled managed servers for `protocol`.
    pub fn managed_servers(&self, protocol: ServerProtocol) -> impl Iterator<Item = &ManagedServer> {
        self.managed_servers
            .iter()
            .filter(move |server| server.enabled && server.protocol == protocol)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
