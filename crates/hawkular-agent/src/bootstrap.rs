//! Agent bootstrap orchestration.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hawkular_agent_config::{
    Config, ConfigError, GatewayPreparationError, ManagedServer, ServerProtocol,
};
use thiserror::Error;

use crate::engine::{AgentCoreEngine, LocalServerHints};
use crate::feedcomm::{CommandRegistry, FeedCommProcessor, ResponseListener};
use crate::health::HealthReporter;
use crate::protocol::{
    DisconnectedConnector, DmrEndpointService, JmxEndpointService, ManagedEndpointService,
    MonitoredEndpoint, ProtocolServices,
};
use crate::storage::{NotificationDispatcher, StorageError, StorageSink};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{GatewayConnectionHandler, ListenerError, ListenerHandle, SocketListener};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "hawkular-agent.toml";

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the agent configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's failure, shared so reporters can keep it.
    fn load(&self) -> Result<Config, Arc<ConfigError>>;
}

/// Loads a TOML file and applies command-line overrides.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
/// read when present and defaults are used otherwise.
#[derive(Debug, Clone, Default)]
pub struct FileConfigLoader {
    path: Option<Utf8PathBuf>,
    log_filter: Option<String>,
}

impl FileConfigLoader {
    /// A loader for `path`, or the default location when `None`.
    #[must_use]
    pub const fn new(path: Option<Utf8PathBuf>) -> Self {
        Self {
            path,
            log_filter: None,
        }
    }

    /// Replaces the configured log filter after loading.
    #[must_use]
    pub fn with_log_filter(mut self, log_filter: Option<String>) -> Self {
        self.log_filter = log_filter;
        self
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<Config, Arc<ConfigError>> {
        let mut config = match &self.path {
            Some(path) => Config::load_from(path),
            None => Config::load_or_default(Utf8Path::new(DEFAULT_CONFIG_PATH)),
        }
        .map_err(Arc::new)?;
        if let Some(filter) = &self.log_filter {
            config.log_filter.clone_from(filter);
        }
        Ok(config)
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Always yields `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<ConfigError>> {
        Ok(self.config.clone())
    }
}

/// Builds the endpoint service of each managed server.
///
/// This is where an embedder links real DMR or JMX clients in.
pub trait EndpointFactory: Send + Sync {
    /// Service for a server speaking DMR.
    fn dmr_service(&self, server: &ManagedServer) -> Arc<DmrEndpointService>;

    /// Service for a server speaking JMX.
    fn jmx_service(&self, server: &ManagedServer) -> Arc<JmxEndpointService>;
}

/// Factory whose services never connect; every session open fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedEndpointFactory;

impl EndpointFactory for DisconnectedEndpointFactory {
    fn dmr_service(&self, server: &ManagedServer) -> Arc<DmrEndpointService> {
        Arc::new(ManagedEndpointService::new(
            monitored(server),
            Arc::new(DisconnectedConnector),
        ))
    }

    fn jmx_service(&self, server: &ManagedServer) -> Arc<JmxEndpointService> {
        Arc::new(ManagedEndpointService::new(
            monitored(server),
            Arc::new(DisconnectedConnector),
        ))
    }
}

fn monitored(server: &ManagedServer) -> MonitoredEndpoint {
    MonitoredEndpoint::new(server.name.clone(), server.protocol, server.local)
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<ConfigError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The gateway socket directory could not be prepared.
    #[error("failed to prepare command gateway socket: {source}")]
    Gateway {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: GatewayPreparationError,
    },
    /// The storage writer could not be started.
    #[error("failed to start storage sink: {source}")]
    Storage {
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
}

/// A bootstrapped agent, ready to serve the command gateway.
pub struct Agent {
    engine: Arc<AgentCoreEngine>,
    storage: Arc<StorageSink>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Agent {
    /// The engine commands run against.
    #[must_use]
    pub const fn engine(&self) -> &Arc<AgentCoreEngine> {
        &self.engine
    }

    /// The storage sink fed by response listeners.
    #[must_use]
    pub const fn storage(&self) -> &Arc<StorageSink> {
        &self.storage
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// A processor answering every known request.
    #[must_use]
    pub fn processor(&self) -> FeedCommProcessor {
        FeedCommProcessor::new(CommandRegistry::with_defaults(), Arc::clone(&self.engine))
    }

    /// Listeners told about every reply the gateway sends.
    #[must_use]
    pub fn response_listeners(&self) -> Vec<Arc<dyn ResponseListener>> {
        vec![Arc::new(NotificationDispatcher::new(Arc::clone(&self.storage)))]
    }

    /// Binds the command gateway and starts accepting connections.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the endpoint cannot be bound.
    pub fn serve(&self) -> Result<ListenerHandle, ListenerError> {
        let endpoint = self.engine.config().command_gateway();
        let listener = SocketListener::bind(endpoint)?;
        let handler = Arc::new(GatewayConnectionHandler::new(
            Arc::new(self.processor()),
            self.response_listeners(),
        ));
        let handle = listener.start(handler)?;
        self.reporter.gateway_listening(endpoint);
        Ok(handle)
    }
}

/// Bootstraps the agent using the supplied collaborators.
///
/// # Errors
///
/// Returns the first [`BootstrapError`]; the reporter has already seen it.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    factory: &dyn EndpointFactory,
) -> Result<Agent, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => return Err(fail(&*reporter, BootstrapError::Configuration { source })),
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => return Err(fail(&*reporter, BootstrapError::Telemetry { source })),
    };

    if let Err(source) = config.command_gateway().prepare_filesystem() {
        return Err(fail(&*reporter, BootstrapError::Gateway { source }));
    }

    let storage = match StorageSink::for_adapter(config.storage_adapter()) {
        Ok(sink) => Arc::new(sink),
        Err(source) => return Err(fail(&*reporter, BootstrapError::Storage { source })),
    };

    let protocols = register_endpoints(&config, &*reporter, factory);
    let hints = LocalServerHints::capture(&config);
    reporter.bootstrap_succeeded(&config);

    Ok(Agent {
        engine: Arc::new(AgentCoreEngine::new(config, hints, protocols)),
        storage,
        telemetry,
        reporter,
    })
}

fn fail(reporter: &dyn HealthReporter, error: BootstrapError) -> BootstrapError {
    reporter.bootstrap_failed(&error);
    error
}

fn register_endpoints(
    config: &Config,
    reporter: &dyn HealthReporter,
    factory: &dyn EndpointFactory,
) -> ProtocolServices {
    let mut protocols = ProtocolServices::new();
    for server in config.managed_servers(ServerProtocol::Dmr) {
        let service = factory.dmr_service(server);
        reporter.endpoint_registered(service.monitored_endpoint());
        protocols.dmr_mut().register(service);
    }
    for server in config.managed_servers(ServerProtocol::Jmx) {
        let service = factory.jmx_service(server);
        reporter.endpoint_registered(service.monitored_endpoint());
        protocols.jmx_mut().register(service);
    }
    protocols
}

#[cfg(test)]
mod tests;
