//! JMX sessions and object-name locations.

use std::fmt;

use thiserror::Error;

use super::{Session, SessionError};
use crate::inventory::NodeLocation;
use crate::params::ParamValue;

/// An MBean object name such as `java.lang:type=Memory`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    /// Wraps an object name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Text form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before `:`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(domain, _)| domain)
    }

    /// `key=value` properties after the `:`.
    pub fn key_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split_once(':')
            .map(|(_, keys)| keys)
            .unwrap_or_default()
            .split(',')
            .filter_map(|pair| pair.split_once('='))
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl NodeLocation for ObjectName {
    /// Operation locations on MBeans are absolute object names.
    fn absolutize(&self, relative: Option<&Self>) -> Self {
        relative.unwrap_or(self).clone()
    }

    fn contains(&self, other: &Self) -> bool {
        self.domain() == other.domain()
            && self
                .key_properties()
                .all(|pair| other.key_properties().any(|candidate| candidate == pair))
    }
}

/// Failure reported by an MBean server connection.
#[derive(Debug, Clone, Error)]
pub enum JmxError {
    /// The MBean operation raised an error.
    #[error("MBean operation [{operation}] on [{target}] failed: {message}")]
    Invocation {
        /// Target MBean.
        target: String,
        /// Operation name.
        operation: String,
        /// Error text.
        message: String,
    },
    /// The connection itself failed.
    #[error("JMX connection failure: {message}")]
    Connection {
        /// Error text.
        message: String,
    },
}

/// Connection to an MBean server.
pub trait MBeanConnection: Send {
    /// Invokes `operation` on `target` with typed arguments.
    ///
    /// `signature` holds the declared Java type name of every argument.
    fn invoke(
        &self,
        target: &ObjectName,
        operation: &str,
        arguments: &[ParamValue],
        signature: &[&'static str],
    ) -> Result<Option<ParamValue>, JmxError>;

    /// Releases the connection.
    fn close(&self) -> Result<(), JmxError>;
}

/// A JMX connection to one server.
pub struct JmxSession {
    endpoint: String,
    connection: Box<dyn MBeanConnection>,
}

impl JmxSession {
    /// Wraps a connected MBean server connection.
    pub fn new(endpoint: impl Into<String>, connection: Box<dyn MBeanConnection>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connection,
        }
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &dyn MBeanConnection {
        self.connection.as_ref()
    }
}

impl Session for JmxSession {
    fn endpoint_name(&self) -> &str {
        &self.endpoint
    }

    fn close(&mut self) -> Result<(), SessionError> {
        self.connection
            .close()
            .map_err(|error| SessionError::close(&self.endpoint, error.to_string()))
    }
}
