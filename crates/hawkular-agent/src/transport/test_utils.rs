//! Test doubles for the transport module.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ConnectionHandler, ConnectionStream};

/// Counts connections and closes them immediately.
pub(crate) struct CountingHandler {
    handled: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// The handler and the counter it bumps.
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let handled = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            handled: Arc::clone(&handled),
        });
        (handled, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, stream: ConnectionStream) {
        drop(stream);
        self.handled.fetch_add(1, Ordering::SeqCst);
    }
}
