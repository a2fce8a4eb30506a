//! Outbound sink for agent payloads.
//!
//! Payloads are JSON values handed to a background writer thread. Callers
//! either fire and forget or wait a bounded time for the write to land.
//! [`NotificationDispatcher`] feeds the sink with `resource-changed`
//! notifications whenever a mutating command reported success.

mod notification;
mod sink;
mod writer;

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

pub use notification::{NotificationDispatcher, RESOURCE_CHANGED, ResourceChangedNotification};
pub use sink::{StorageSink, Stored};
pub use writer::{LogWriter, PayloadWriter, SpoolWriter};

const STORAGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::storage");

/// Errors raised while storing a payload.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The spool file could not be opened or written.
    #[error("failed to write payload to '{path}': {source}")]
    Io {
        /// Spool file.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: Arc<io::Error>,
    },
    /// The payload could not be serialised.
    #[error("failed to encode payload: {source}")]
    Encode {
        /// Serialiser failure.
        #[source]
        source: Arc<serde_json::Error>,
    },
    /// The writer thread could not be started.
    #[error("failed to start storage writer: {source}")]
    Spawn {
        /// Spawn failure.
        #[source]
        source: Arc<io::Error>,
    },
    /// The writer thread is gone.
    #[error("storage sink is closed")]
    Closed,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn encode(source: serde_json::Error) -> Self {
        Self::Encode {
            source: Arc::new(source),
        }
    }
}

#[cfg(test)]
mod tests;
