//! The stock endpoint service.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use super::{EndpointService, MonitoredEndpoint, PROTOCOL_TARGET, Session, SessionError};
use crate::inventory::{NodeLocation, ResourceManager};

/// Opens protocol sessions for an endpoint.
///
/// This is the seam where an embedder plugs in a vendor client.
pub trait SessionConnector<S>: Send + Sync {
    /// Connects a new session to `endpoint`.
    fn connect(&self, endpoint: &MonitoredEndpoint) -> Result<S, SessionError>;
}

impl<S, F> SessionConnector<S> for F
where
    F: Fn(&MonitoredEndpoint) -> Result<S, SessionError> + Send + Sync,
{
    fn connect(&self, endpoint: &MonitoredEndpoint) -> Result<S, SessionError> {
        self(endpoint)
    }
}

/// Connector used when no client library is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedConnector;

impl<S> SessionConnector<S> for DisconnectedConnector {
    fn connect(&self, endpoint: &MonitoredEndpoint) -> Result<S, SessionError> {
        Err(SessionError::unavailable(
            endpoint,
            format!("no {} client is available", endpoint.protocol()),
        ))
    }
}

/// Endpoint service backed by a connector and an in-memory inventory.
///
/// `discover_all` raises a generation counter; the discovery scheduler
/// compares it with the last generation it scanned.
pub struct ManagedEndpointService<L: NodeLocation, S: Session> {
    endpoint: MonitoredEndpoint,
    connector: Arc<dyn SessionConnector<S>>,
    resources: ResourceManager<L>,
    discovery_requests: AtomicU64,
}

impl<L: NodeLocation, S: Session> ManagedEndpointService<L, S> {
    /// A service for `endpoint` with an empty inventory.
    pub fn new(endpoint: MonitoredEndpoint, connector: Arc<dyn SessionConnector<S>>) -> Self {
        Self {
            endpoint,
            connector,
            resources: ResourceManager::new(),
            discovery_requests: AtomicU64::new(0),
        }
    }

    /// Number of rediscoveries requested so far.
    #[must_use]
    pub fn discovery_generation(&self) -> u64 {
        self.discovery_requests.load(Ordering::SeqCst)
    }
}

impl<L: NodeLocation, S: Session> EndpointService<L, S> for ManagedEndpointService<L, S> {
    fn monitored_endpoint(&self) -> &MonitoredEndpoint {
        &self.endpoint
    }

    fn open_session(&self) -> Result<S, SessionError> {
        debug!(target: PROTOCOL_TARGET, endpoint = %self.endpoint, "opening session");
        self.connector.connect(&self.endpoint)
    }

    fn resource_manager(&self) -> &ResourceManager<L> {
        &self.resources
    }

    fn discover_all(&self) {
        let generation = self.discovery_requests.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            target: PROTOCOL_TARGET,
            endpoint = %self.endpoint,
            generation,
            "full discovery requested"
        );
    }

    fn remove_resources(&self, location: &L) {
        let removed = self.resources.remove_resources(location);
        debug!(
            target: PROTOCOL_TARGET,
            endpoint = %self.endpoint,
            location = %location,
            removed = removed.len(),
            "removed resources from inventory"
        );
    }
}
