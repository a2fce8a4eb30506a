use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// Management protocol spoken by a managed server.
#[derive(
    Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ServerProtocol {
    /// JBoss/WildFly native management model.
    Dmr,
    /// Java Management Extensions.
    Jmx,
}

/// A single application-server instance the agent manages.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ManagedServer {
    /// Name used in resource identifiers (`<feed>~<name>~<path>`).
    pub name: String,
    /// Protocol registry the server belongs to.
    pub protocol: ServerProtocol,
    /// Whether the server runs in the same process or host as the agent.
    #[serde(default)]
    pub local: bool,
    /// Disabled servers are kept in the file but never registered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Connection URL for remote servers.
    #[serde(default)]
    pub url: Option<Url>,
}

impl ManagedServer {
    /// Describes a server that lives alongside the agent.
    #[must_use]
    pub fn local(name: impl Into<String>, protocol: ServerProtocol) -> Self {
        Self {
            name: name.into(),
            protocol,
            local: true,
            enabled: true,
            url: None,
        }
    }

    /// Describes a server reached over the network.
    #[must_use]
    pub fn remote(name: impl Into<String>, protocol: ServerProtocol, url: Url) -> Self {
        Self {
            name: name.into(),
            protocol,
            local: false,
            enabled: true,
            url: Some(url),
        }
    }
}

const fn enabled_by_default() -> bool {
    true
}
