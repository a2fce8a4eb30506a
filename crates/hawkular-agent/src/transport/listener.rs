//! Listener implementation for the gateway socket.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hawkular_agent_config::GatewayEndpoint;
use tracing::{debug, info, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use camino::Utf8Path;
#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};

/// Pause between polls when no client is waiting.
const IDLE_POLL: Duration = Duration::from_millis(25);
/// Pause after a failed accept.
const FAILURE_PAUSE: Duration = Duration::from_millis(150);

/// Listener bound to the gateway endpoint.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: GatewayEndpoint,
    socket: GatewaySocket,
}

#[derive(Debug)]
enum GatewaySocket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl GatewaySocket {
    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Next waiting client, switched back to blocking IO.
    fn poll(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(listener) => listener.accept().and_then(|(stream, peer)| {
                debug!(target: LISTENER_TARGET, %peer, "gateway client connected");
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            Self::Unix(listener) => listener.accept().and_then(|(stream, _)| {
                debug!(target: LISTENER_TARGET, "gateway client connected");
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &GatewayEndpoint) -> Result<Self, ListenerError> {
        let socket = match endpoint {
            GatewayEndpoint::Tcp { host, port } => GatewaySocket::Tcp(bind_tcp(host, *port)?),
            #[cfg(unix)]
            GatewayEndpoint::Unix { path } => GatewaySocket::Unix(bind_unix(path)?),
            #[cfg(not(unix))]
            GatewayEndpoint::Unix { .. } => {
                return Err(ListenerError::UnsupportedUnix {
                    endpoint: endpoint.to_string(),
                });
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// Bound TCP address; `None` for unix sockets.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            GatewaySocket::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            GatewaySocket::Unix(_) => None,
        }
    }

    /// Serves connections on a background thread until the handle stops it.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.socket.set_nonblocking() {
            self.remove_socket_file();
            return Err(ListenerError::NonBlocking { source });
        }
        let local_addr = self.local_addr();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_requested = Arc::clone(&stop);
        let accept_thread = thread::Builder::new()
            .name("gateway-accept".to_owned())
            .spawn(move || self.serve(&stop_requested, &handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            stop,
            local_addr,
            accept_thread: Some(accept_thread),
        })
    }

    fn serve(&self, stop: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "command gateway accepting connections"
        );
        let mut repeated_failure = None::<io::ErrorKind>;
        let mut served = 0_u64;
        while !stop.load(Ordering::SeqCst) {
            match self.socket.poll() {
                Ok(Some(stream)) => {
                    repeated_failure = None;
                    served += 1;
                    dispatch(served, stream, handler);
                }
                Ok(None) => thread::sleep(IDLE_POLL),
                Err(error) => {
                    if repeated_failure != Some(error.kind()) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "failed to accept gateway connection"
                        );
                    }
                    repeated_failure = Some(error.kind());
                    thread::sleep(FAILURE_PAUSE);
                }
            }
        }

        self.remove_socket_file();
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            served,
            "command gateway stopped"
        );
    }

    #[cfg(unix)]
    fn remove_socket_file(&self) {
        let Some(path) = self.endpoint.unix_path() else {
            return;
        };
        if let Err(error) = fs::remove_file(path)
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                path = %path,
                "failed to remove gateway socket file"
            );
        }
    }

    #[cfg(not(unix))]
    const fn remove_socket_file(&self) {}
}

/// Runs one connection on its own thread.
fn dispatch(sequence: u64, stream: ConnectionStream, handler: &Arc<dyn ConnectionHandler>) {
    let connection_handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(format!("gateway-conn-{sequence}"))
        .spawn(move || connection_handler.handle(stream));
    if let Err(error) = spawned {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            "dropping gateway connection: no thread available"
        );
    }
}

/// Handle to the background accept thread.
///
/// Dropping the handle asks the thread to stop without waiting for it.
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
    accept_thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop after its current iteration.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Bound TCP address, useful when the configured port was `0`.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Waits for the accept loop to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the loop panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        self.accept_thread
            .take()
            .map_or(Ok(()), |thread| thread.join().map_err(|_| ListenerError::ThreadPanic))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            endpoint: format!("{host}:{port}"),
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::NoAddress {
            endpoint: format!("{host}:{port}"),
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
fn bind_unix(path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        reclaim_stale_socket(path)?;
    }
    UnixListener::bind(path).map_err(|source| ListenerError::unix_socket(path, "bind", source))
}

/// Removes a socket file left behind by an agent that is no longer running.
///
/// Regular files and sockets with a live listener are never touched.
#[cfg(unix)]
fn reclaim_stale_socket(path: &Utf8Path) -> Result<(), ListenerError> {
    let file_type = fs::symlink_metadata(path)
        .map_err(|source| ListenerError::unix_socket(path, "inspect", source))?
        .file_type();
    if !file_type.is_socket() {
        return Err(ListenerError::UnixNotSocket {
            path: path.to_path_buf(),
        });
    }
    match UnixStream::connect(path) {
        Ok(_live) => Err(ListenerError::UnixInUse {
            path: path.to_path_buf(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            debug!(target: LISTENER_TARGET, path = %path, "removing stale gateway socket");
            fs::remove_file(path).map_err(|source| ListenerError::unix_socket(path, "remove", source))
        }
        Err(source) => Err(ListenerError::unix_socket(path, "probe", source)),
    }
}
