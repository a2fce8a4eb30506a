//! Destinations for stored payloads.

use std::fs::{self, File, OpenOptions};
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::info;

use super::{STORAGE_TARGET, StorageError};

/// Writes one payload at a time on the sink's writer thread.
#[cfg_attr(test, mockall::automock)]
pub trait PayloadWriter: Send {
    /// Persists `payload`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the payload could not be written.
    fn write(&mut self, payload: &Value) -> Result<(), StorageError>;
}

/// Appends payloads as JSON lines to a spool file.
///
/// The file and its parent directories are created on the first write.
#[derive(Debug)]
pub struct SpoolWriter {
    path: Utf8PathBuf,
    file: Option<File>,
}

impl SpoolWriter {
    /// A writer appending to `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// The spool file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open(&mut self) -> Result<&mut File, StorageError> {
        let file = self.file.take().map_or_else(|| open_spool(&self.path), Ok)?;
        Ok(self.file.insert(file))
    }
}

fn open_spool(path: &Utf8Path) -> Result<File, StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| StorageError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StorageError::io(path, source))
}

impl PayloadWriter for SpoolWriter {
    fn write(&mut self, payload: &Value) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(payload).map_err(StorageError::encode)?;
        line.push(b'\n');
        let path = self.path.clone();
        let file = self.open()?;
        file.write_all(&line)
            .and_then(|()| file.flush())
            .map_err(|source| StorageError::io(path, source))
    }
}

/// Records payloads in the agent log when no spool file is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl PayloadWriter for LogWriter {
    fn write(&mut self, payload: &Value) -> Result<(), StorageError> {
        info!(target: STORAGE_TARGET, payload = %payload, "stored payload");
        Ok(())
    }
}
