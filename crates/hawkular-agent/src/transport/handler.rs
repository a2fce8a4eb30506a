//! Connection handling for the gateway listener.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use tracing::{debug, warn};

use super::LISTENER_TARGET;
use crate::feedcomm::{FeedCommProcessor, ResponseListener};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Upper bound for one request frame, binary data included.
pub(crate) const MAX_FRAME_BYTES: u64 = 64 * 1024 * 1024;

/// Stream types accepted by the gateway listener.
pub(crate) enum ConnectionStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ConnectionStream {
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

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}

/// Reads one request frame, runs it, and writes the reply back.
///
/// The client signals the end of its frame by shutting down its write half.
pub struct GatewayConnectionHandler {
    processor: Arc<FeedCommProcessor>,
    listeners: Vec<Arc<dyn ResponseListener>>,
}

impl GatewayConnectionHandler {
    /// A handler notifying `listeners` after every reply.
    #[must_use]
    pub fn new(processor: Arc<FeedCommProcessor>, listeners: Vec<Arc<dyn ResponseListener>>) -> Self {
        Self {
            processor,
            listeners,
        }
    }
}

impl ConnectionHandler for GatewayConnectionHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let frame = match read_frame(&mut stream) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!(target: LISTENER_TARGET, "connection closed without a request");
                return;
            }
            Err(error) => {
                warn!(
                    target: LISTENER_TARGET,
                    error = %error,
                    "failed to read request frame"
                );
                return;
            }
        };

        let exchange = self.processor.process(&frame);
        // The processor already logged the failure and told the listeners.
        let _sent = self.processor.send(&exchange, &mut stream, &self.listeners);
    }
}

/// Reads until end of stream. `None` means the peer sent nothing.
pub(crate) fn read_frame<R: Read>(stream: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut frame = Vec::new();
    let mut bounded = stream.take(MAX_FRAME_BYTES + 1);
    loop {
        match bounded.read_to_end(&mut frame) {
            Ok(_) => break,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    if !u64::try_from(frame.len()).is_ok_and(|size| size <= MAX_FRAME_BYTES) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "request exceeds maximum size",
        ));
    }
    Ok((!frame.is_empty()).then_some(frame))
}
