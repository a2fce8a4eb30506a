//! Background writer thread with an optional bounded wait.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hawkular_agent_config::StorageAdapter;
use serde_json::Value;
use tracing::{debug, warn};

use super::{LogWriter, PayloadWriter, STORAGE_TARGET, SpoolWriter, StorageError};

/// What happened to a payload by the time [`StorageSink::store`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    /// Handed to the writer; the caller did not wait.
    Queued,
    /// Written within the wait.
    Written,
    /// Still pending when the wait ran out.
    Pending,
}

struct Job {
    payload: Value,
    done: Option<SyncSender<Result<(), StorageError>>>,
}

/// Owns the writer thread. Dropping the sink drains queued payloads and
/// joins the thread.
pub struct StorageSink {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl StorageSink {
    /// Starts a writer thread around `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Spawn`] when the thread cannot be started.
    pub fn start(writer: Box<dyn PayloadWriter>) -> Result<Self, StorageError> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("storage-writer".to_owned())
            .spawn(move || {
                let mut owned = writer;
                drain(owned.as_mut(), &receiver);
            })
            .map_err(|source| StorageError::Spawn {
                source: source.into(),
            })?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Spools to the adapter's `spool_path`, or logs payloads when unset.
    ///
    /// # Errors
    ///
    /// See [`StorageSink::start`].
    pub fn for_adapter(adapter: &StorageAdapter) -> Result<Self, StorageError> {
        let writer: Box<dyn PayloadWriter> = match &adapter.spool_path {
            Some(path) => Box::new(SpoolWriter::new(path.clone())),
            None => Box::new(LogWriter),
        };
        Self::start(writer)
    }

    /// Hands `payload` to the writer.
    ///
    /// Without `wait` this returns [`Stored::Queued`] at once. With a wait it
    /// blocks for at most that long; running out of time is not an error.
    ///
    /// # Errors
    ///
    /// Returns the writer's error when the write failed within the wait, or
    /// [`StorageError::Closed`] when the writer thread is gone.
    pub fn store(&self, payload: Value, wait: Option<Duration>) -> Result<Stored, StorageError> {
        let sender = self.sender.as_ref().ok_or(StorageError::Closed)?;
        let Some(limit) = wait else {
            sender
                .send(Job {
                    payload,
                    done: None,
                })
                .map_err(|_| StorageError::Closed)?;
            return Ok(Stored::Queued);
        };

        let (done, outcome) = mpsc::sync_channel(1);
        sender
            .send(Job {
                payload,
                done: Some(done),
            })
            .map_err(|_| StorageError::Closed)?;
        match outcome.recv_timeout(limit) {
            Ok(Ok(())) => Ok(Stored::Written),
            Ok(Err(error)) => Err(error),
            Err(RecvTimeoutError::Timeout) => {
                debug!(
                    target: STORAGE_TARGET,
                    wait_ms = limit.as_millis(),
                    "payload still pending after wait"
                );
                Ok(Stored::Pending)
            }
            Err(RecvTimeoutError::Disconnected) => Err(StorageError::Closed),
        }
    }
}

impl Drop for StorageSink {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!(target: STORAGE_TARGET, "storage writer panicked");
        }
    }
}

fn drain(writer: &mut dyn PayloadWriter, receiver: &Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        let outcome = writer.write(&job.payload);
        if let Err(error) = &outcome {
            warn!(target: STORAGE_TARGET, error = %error, "failed to store payload");
        }
        if let Some(done) = job.done {
            // The caller may have stopped waiting.
            let _delivered = done.try_send(outcome);
        }
    }
}
