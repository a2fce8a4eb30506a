//! Error types for gateway listener operations.

use std::io;
use std::net::SocketAddr;

#[cfg(unix)]
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while binding or running the gateway listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The gateway host name did not resolve.
    #[error("failed to resolve command gateway {endpoint}: {source}")]
    Resolve {
        /// Configured `host:port`.
        endpoint: String,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The gateway host name resolved to no address.
    #[error("command gateway {endpoint} resolved to no address")]
    NoAddress {
        /// Configured `host:port`.
        endpoint: String,
    },
    /// Binding the TCP socket failed.
    #[error("failed to bind command gateway at {addr}: {source}")]
    BindTcp {
        /// Resolved address.
        addr: SocketAddr,
        /// Bind failure.
        #[source]
        source: io::Error,
    },
    /// The listener could not be switched to non-blocking mode.
    #[error("failed to make the command gateway non-blocking: {source}")]
    NonBlocking {
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The accept thread could not be started.
    #[error("failed to spawn the command gateway thread: {source}")]
    Spawn {
        /// Spawn failure.
        #[source]
        source: io::Error,
    },
    /// Unix sockets are unavailable on this platform.
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix {
        /// The configured endpoint.
        endpoint: String,
    },
    /// A filesystem step on the gateway socket failed.
    #[cfg(unix)]
    #[error("failed to {step} gateway socket {path}: {source}")]
    UnixSocket {
        /// Socket path.
        path: Utf8PathBuf,
        /// What was being done: bind, inspect, probe or remove.
        step: &'static str,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Another agent is serving the socket.
    #[cfg(unix)]
    #[error("gateway socket {path} is already in use")]
    UnixInUse {
        /// Socket path.
        path: Utf8PathBuf,
    },
    /// Something other than a socket sits at the path.
    #[cfg(unix)]
    #[error("gateway socket path {path} is not a socket")]
    UnixNotSocket {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The accept loop panicked.
    #[error("command gateway thread panicked")]
    ThreadPanic,
}

#[cfg(unix)]
impl ListenerError {
    pub(super) fn unix_socket(path: &camino::Utf8Path, step: &'static str, source: io::Error) -> Self {
        Self::UnixSocket {
            path: path.to_path_buf(),
            step,
            source,
        }
    }
}
