//! Process-wide state shared by every command.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use hawkular_agent_config::Config;
use hawkular_cmdgw_api::Authentication;
use tracing::info;

use crate::protocol::{MonitoredEndpoint, ProtocolServices};

/// Environment variable naming the managed server's installation directory.
pub const JBOSS_HOME_ENV: &str = "JBOSS_HOME";

const MODULES_DIR: &str = "modules";
const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");

/// Signals that the agent shares a filesystem with the managed server.
///
/// An endpoint flagged local always qualifies. Otherwise the agent counts as
/// embedded when `JBOSS_HOME` was set at start-up or `jboss_home` is
/// configured. This is a heuristic, not an access-control boundary.
///
/// The installation directory comes only from `JBOSS_HOME` or `jboss_home`.
/// A JVM-embedded agent would also read the `jboss.home.dir` system
/// property; this process has no such property to consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalServerHints {
    jboss_home_env: Option<Utf8PathBuf>,
    configured: Option<Utf8PathBuf>,
}

impl LocalServerHints {
    /// Hints from explicit values.
    #[must_use]
    pub const fn new(jboss_home_env: Option<Utf8PathBuf>, configured: Option<Utf8PathBuf>) -> Self {
        Self {
            jboss_home_env,
            configured,
        }
    }

    /// Reads `JBOSS_HOME` once and combines it with `config`.
    #[must_use]
    pub fn capture(config: &Config) -> Self {
        let from_env = env::var(JBOSS_HOME_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from);
        Self::new(from_env, config.jboss_home().map(Utf8Path::to_path_buf))
    }

    /// The installation directory, preferring the environment.
    #[must_use]
    pub fn jboss_home(&self) -> Option<&Utf8Path> {
        self.jboss_home_env
            .as_deref()
            .or(self.configured.as_deref())
    }

    /// Whether filesystem changes on `endpoint` may be attempted.
    #[must_use]
    pub fn allows(&self, endpoint: &MonitoredEndpoint) -> bool {
        endpoint.is_local() || self.jboss_home().is_some()
    }

    /// `<jboss_home>/modules`, when the installation directory is known.
    #[must_use]
    pub fn modules_root(&self) -> Option<Utf8PathBuf> {
        self.jboss_home().map(|home| home.join(MODULES_DIR))
    }
}

/// Everything commands need from the running agent.
pub struct AgentCoreEngine {
    config: Config,
    immutable: AtomicBool,
    local_hints: LocalServerHints,
    protocols: ProtocolServices,
}

impl AgentCoreEngine {
    /// Builds the engine; the immutability flag starts from `config`.
    #[must_use]
    pub fn new(config: Config, local_hints: LocalServerHints, protocols: ProtocolServices) -> Self {
        let immutable = AtomicBool::new(config.is_immutable());
        Self {
            config,
            immutable,
            local_hints,
            protocols,
        }
    }

    /// The configuration the agent started with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Feed identifier reported with every resource.
    #[must_use]
    pub fn feed_id(&self) -> &str {
        self.config.feed_id()
    }

    /// Whether mutating commands are currently rejected.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable.load(Ordering::SeqCst)
    }

    /// Flips the immutability flag at runtime.
    pub fn set_immutable(&self, immutable: bool) {
        let previous = self.immutable.swap(immutable, Ordering::SeqCst);
        if previous != immutable {
            info!(target: ENGINE_TARGET, immutable, "agent immutability changed");
        }
    }

    /// Local-server hints captured at start-up.
    #[must_use]
    pub const fn local_hints(&self) -> &LocalServerHints {
        &self.local_hints
    }

    /// DMR and JMX endpoint registries.
    #[must_use]
    pub const fn protocols(&self) -> &ProtocolServices {
        &self.protocols
    }

    /// Storage adapter credentials, used as default outbound authentication.
    #[must_use]
    pub fn storage_authentication(&self) -> Option<Authentication> {
        let adapter = self.config.storage_adapter();
        if adapter.username.is_none() && adapter.password.is_none() {
            return None;
        }
        Some(Authentication {
            username: adapter.username.clone(),
            password: adapter.password.clone(),
            persona: None,
        })
    }
}
