//! Per-server endpoint services and the registries that hold them.
//!
//! Each configured managed server gets one long-lived [`EndpointService`]
//! per protocol. Commands look a service up by server name, open a session
//! for the duration of one command and ask the service to rediscover after
//! a structural change.

mod dmr;
mod jmx;
mod registry;
mod service;

pub use dmr::DmrSession;
pub use jmx::{JmxError, JmxSession, MBeanConnection, ObjectName};
pub use registry::{EndpointRegistry, ProtocolServices};
pub use service::{DisconnectedConnector, ManagedEndpointService, SessionConnector};

use std::fmt;

use hawkular_agent_config::ServerProtocol;
use hawkular_dmr_client::Address;
use thiserror::Error;
use tracing::warn;

use crate::inventory::{NodeLocation, ResourceManager};

pub(crate) const PROTOCOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::protocol");

/// Identity of a managed server as seen by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredEndpoint {
    name: String,
    protocol: ServerProtocol,
    local: bool,
}

impl MonitoredEndpoint {
    /// Describes server `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, protocol: ServerProtocol, local: bool) -> Self {
        Self {
            name: name.into(),
            protocol,
            local,
        }
    }

    /// Managed-server name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Protocol the server speaks.
    #[must_use]
    pub const fn protocol(&self) -> ServerProtocol {
        self.protocol
    }

    /// Whether the server shares the agent's host and filesystem.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.local
    }
}

impl fmt::Display for MonitoredEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.protocol)
    }
}

/// Failure to open or close a session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No client could be connected to the server.
    #[error("cannot open session to [{endpoint}]: {message}")]
    Unavailable {
        /// Server name.
        endpoint: String,
        /// Reason reported by the connector.
        message: String,
    },
    /// Closing the session failed.
    #[error("cannot close session to [{endpoint}]: {message}")]
    Close {
        /// Server name.
        endpoint: String,
        /// Reason reported by the client.
        message: String,
    },
}

impl SessionError {
    /// Connector failure for `endpoint`.
    pub fn unavailable(endpoint: &MonitoredEndpoint, message: impl Into<String>) -> Self {
        Self::Unavailable {
            endpoint: endpoint.name().to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn close(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Close {
            endpoint: endpoint.to_owned(),
            message: message.into(),
        }
    }
}

/// A protocol connection held for one command.
pub trait Session: Send {
    /// Name of the server the session talks to.
    fn endpoint_name(&self) -> &str;

    /// Releases the connection.
    fn close(&mut self) -> Result<(), SessionError>;
}

/// Facade for one managed server over one protocol.
///
/// Implementations must tolerate concurrent `open_session` calls from
/// commands running on different threads; each call returns an independent
/// session.
pub trait EndpointService<L: NodeLocation, S: Session>: Send + Sync {
    /// The server this service manages.
    fn monitored_endpoint(&self) -> &MonitoredEndpoint;

    /// Connects a fresh session.
    fn open_session(&self) -> Result<S, SessionError>;

    /// Resources discovered on the server.
    fn resource_manager(&self) -> &ResourceManager<L>;

    /// Requests a full rediscovery of the server.
    fn discover_all(&self);

    /// Drops inventory at or below `location`.
    fn remove_resources(&self, location: &L);
}

/// Service type registered for DMR servers.
pub type DmrEndpointService = dyn EndpointService<Address, DmrSession>;

/// Service type registered for JMX servers.
pub type JmxEndpointService = dyn EndpointService<ObjectName, JmxSession>;

/// Closes the wrapped session when dropped.
///
/// Close failures are logged and never replace the command's outcome.
pub struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    /// Guards an open session.
    pub const fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: Session> std::ops::Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(error) = self.session.close() {
            warn!(
                target: PROTOCOL_TARGET,
                endpoint = self.session.endpoint_name(),
                error = %error,
                "failed to close session"
            );
        }
    }
}
