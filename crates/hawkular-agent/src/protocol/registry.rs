//! Name-keyed endpoint registries.

use std::collections::BTreeMap;
use std::sync::Arc;

use hawkular_agent_config::ServerProtocol;
use hawkular_dmr_client::Address;

use super::{DmrSession, EndpointService, JmxSession, ObjectName, Session};
use crate::inventory::NodeLocation;

/// Services of one protocol keyed by managed-server name.
///
/// Filled during bootstrap; commands only read it.
pub struct EndpointRegistry<L: NodeLocation, S: Session> {
    services: BTreeMap<String, Arc<dyn EndpointService<L, S>>>,
}

impl<L: NodeLocation, S: Session> Default for EndpointRegistry<L, S> {
    fn default() -> Self {
        Self {
            services: BTreeMap::new(),
        }
    }
}

impl<L: NodeLocation, S: Session> EndpointRegistry<L, S> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` under its endpoint name, replacing any previous one.
    pub fn register(&mut self, service: Arc<dyn EndpointService<L, S>>) {
        let name = service.monitored_endpoint().name().to_owned();
        self.services.insert(name, service);
    }

    /// The service for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn EndpointService<L, S>>> {
        self.services.get(name).cloned()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered server names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// The DMR and JMX registries together.
#[derive(Default)]
pub struct ProtocolServices {
    dmr: EndpointRegistry<Address, DmrSession>,
    jmx: EndpointRegistry<ObjectName, JmxSession>,
}

impl ProtocolServices {
    /// Both registries empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// DMR services.
    #[must_use]
    pub const fn dmr(&self) -> &EndpointRegistry<Address, DmrSession> {
        &self.dmr
    }

    /// DMR services, for registration.
    pub const fn dmr_mut(&mut self) -> &mut EndpointRegistry<Address, DmrSession> {
        &mut self.dmr
    }

    /// JMX services.
    #[must_use]
    pub const fn jmx(&self) -> &EndpointRegistry<ObjectName, JmxSession> {
        &self.jmx
    }

    /// JMX services, for registration.
    pub const fn jmx_mut(&mut self) -> &mut EndpointRegistry<ObjectName, JmxSession> {
        &mut self.jmx
    }

    /// Whether `name` is registered for `protocol`.
    #[must_use]
    pub fn contains(&self, protocol: ServerProtocol, name: &str) -> bool {
        match protocol {
            ServerProtocol::Dmr => self.dmr.contains(name),
            ServerProtocol::Jmx => self.jmx.contains(name),
        }
    }
}
