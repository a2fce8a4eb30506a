//! `resource-changed` notifications for successful mutating commands.

use std::io;
use std::sync::Arc;

use hawkular_cmdgw_api::ResponseStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{STORAGE_TARGET, StorageSink};
use crate::feedcomm::{Exchange, ResponseListener};

/// Kind of notification stored after a successful mutating command.
pub const RESOURCE_CHANGED: &str = "resource-changed";

/// Tells the storage side that a resource may have changed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChangedNotification {
    /// Always [`RESOURCE_CHANGED`].
    pub notification: String,
    /// Feed named in the response.
    pub feed_id: String,
    /// Resource named in the response.
    pub resource_id: String,
    /// Request that caused the change.
    pub operation: String,
}

impl ResourceChangedNotification {
    /// Builds the notification for a sent exchange. `None` when nothing
    /// changed.
    #[must_use]
    pub fn for_exchange(exchange: &Exchange) -> Option<Self> {
        if !exchange.changes_inventory() || exchange.response_status() != Some(ResponseStatus::Ok)
        {
            return None;
        }
        let body = exchange.response()?.body();
        let text = |field: &str| {
            body.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        Some(Self {
            notification: RESOURCE_CHANGED.to_owned(),
            feed_id: text("feedId"),
            resource_id: text("resourceId"),
            operation: exchange.request_name().to_owned(),
        })
    }
}

/// Stores a [`ResourceChangedNotification`] for every reply that reached the
/// client and reported a successful change.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<StorageSink>,
}

impl NotificationDispatcher {
    /// A dispatcher storing into `sink` without waiting.
    #[must_use]
    pub const fn new(sink: Arc<StorageSink>) -> Self {
        Self { sink }
    }
}

impl ResponseListener for NotificationDispatcher {
    fn on_response(&self, exchange: &Exchange, outcome: Result<(), &io::Error>) {
        if outcome.is_err() {
            return;
        }
        let Some(notification) = ResourceChangedNotification::for_exchange(exchange) else {
            return;
        };
        let payload = match serde_json::to_value(&notification) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(target: STORAGE_TARGET, error = %error, "cannot encode notification");
                return;
            }
        };
        match self.sink.store(payload, None) {
            Ok(stored) => debug!(
                target: STORAGE_TARGET,
                operation = %notification.operation,
                resource = %notification.resource_id,
                ?stored,
                "resource change queued"
            ),
            Err(error) => warn!(
                target: STORAGE_TARGET,
                error = %error,
                "failed to queue resource change"
            ),
        }
    }
}
