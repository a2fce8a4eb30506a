//! DMR sessions and locations.

use hawkular_dmr_client::{Address, ModelControllerClient};

use super::{Session, SessionError};
use crate::inventory::NodeLocation;

/// A management-model connection to one server.
pub struct DmrSession {
    endpoint: String,
    client: Box<dyn ModelControllerClient>,
}

impl DmrSession {
    /// Wraps a connected client.
    pub fn new(endpoint: impl Into<String>, client: Box<dyn ModelControllerClient>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &dyn ModelControllerClient {
        self.client.as_ref()
    }
}

impl Session for DmrSession {
    fn endpoint_name(&self) -> &str {
        &self.endpoint
    }

    fn close(&mut self) -> Result<(), SessionError> {
        self.client
            .close()
            .map_err(|error| SessionError::close(&self.endpoint, error.to_string()))
    }
}

impl NodeLocation for Address {
    fn absolutize(&self, relative: Option<&Self>) -> Self {
        match relative {
            Some(path) => self.join(path),
            None => self.clone(),
        }
    }

    fn contains(&self, other: &Self) -> bool {
        other.segments().starts_with(self.segments())
    }
}
