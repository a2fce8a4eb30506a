//! Command dispatch and resource resolution core of the Hawkular agent.
//!
//! The agent watches a set of managed application servers, reached over DMR
//! or JMX, and keeps an inventory of the resources it discovered on each.
//! Operators act on those resources by sending command requests to the
//! agent's command gateway: a local socket accepting one `Name=JSON` frame
//! per connection, optionally followed by binary content.
//!
//! Each frame is handed to a [`FeedCommProcessor`], which decodes the request,
//! looks up its command in a [`CommandRegistry`] and runs it against the
//! [`AgentCoreEngine`]. Commands resolve the resource identifier of the
//! request to a managed server and a model node or `ObjectName`, open a
//! session on that server, and answer with a status and a human-readable
//! message. Commands that change a server schedule its rediscovery.
//!
//! After each reply is written, [`ResponseListener`]s are told about it. The
//! bootstrapped agent registers a [`NotificationDispatcher`] that forwards
//! successful inventory changes to the [`StorageSink`].
//!
//! Startup follows a fixed sequence: load configuration, initialise
//! structured telemetry, prepare the gateway socket directory, start the
//! storage sink and register one endpoint service per enabled managed
//! server. Health reporting hooks see every stage.

mod bootstrap;
pub mod cmd;
mod engine;
mod feedcomm;
mod health;
pub mod id;
pub mod inventory;
mod launch;
pub mod params;
pub mod protocol;
mod shutdown;
mod storage;
mod telemetry;
mod transport;

pub use bootstrap::{
    Agent, BootstrapError, ConfigLoader, DEFAULT_CONFIG_PATH, DisconnectedEndpointFactory,
    EndpointFactory, FileConfigLoader, StaticConfigLoader, bootstrap_with,
};
pub use engine::{AgentCoreEngine, JBOSS_HOME_ENV, LocalServerHints};
pub use feedcomm::{CommandRegistry, Exchange, FeedCommProcessor, ResponseListener, UNKNOWN_REQUEST};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use launch::{LaunchError, LaunchPlan, run_agent};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
pub use storage::{
    LogWriter, NotificationDispatcher, PayloadWriter, RESOURCE_CHANGED,
    ResourceChangedNotification, SpoolWriter, StorageError, StorageSink, Stored,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{GatewayConnectionHandler, ListenerError, ListenerHandle};

#[cfg(test)]
mod tests;
