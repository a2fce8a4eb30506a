//! Socket transport to the agent's command gateway.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use hawkular_agent_config::GatewayEndpoint;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use crate::errors::AppError;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub(crate) enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    /// Signals the end of the request frame.
    fn finish_request(&self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.shutdown(Shutdown::Write),
            #[cfg(unix)]
            Self::Unix(stream) => stream.shutdown(Shutdown::Write),
        }
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(Some(timeout)),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(Some(timeout)),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Sends `frame` and returns everything the agent wrote back.
pub(crate) fn exchange(endpoint: &GatewayEndpoint, frame: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut connection = connect(endpoint)?;
    connection
        .write_all(frame)
        .and_then(|()| connection.flush())
        .and_then(|()| connection.finish_request())
        .map_err(AppError::SendRequest)?;

    connection
        .set_read_timeout(RESPONSE_TIMEOUT)
        .map_err(AppError::ReadResponse)?;
    let mut reply = Vec::new();
    connection
        .read_to_end(&mut reply)
        .map_err(AppError::ReadResponse)?;
    if reply.is_empty() {
        return Err(AppError::MissingResponse);
    }
    Ok(reply)
}

fn connect(endpoint: &GatewayEndpoint) -> Result<Connection, AppError> {
    match endpoint {
        GatewayEndpoint::Tcp { host, port } => {
            let address = resolve_tcp_address(host, *port).map_err(|source| AppError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            })?;
            TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
                .map(Connection::Tcp)
                .map_err(|source| AppError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
        }
        GatewayEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str()).map_err(|source| AppError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
            }

            #[cfg(not(unix))]
            {
                let _ = path;
                Err(AppError::UnsupportedUnixTransport(endpoint.to_string()))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    let stream: UnixStream = socket.into();
    Ok(Connection::Unix(stream))
}
