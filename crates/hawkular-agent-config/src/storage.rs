use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use url::Url;

/// Settings for the remote storage adapter.
///
/// The credentials double as the default authentication attached to every
/// outbound gateway message that does not carry its own.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageAdapter {
    /// Base URL of the storage server.
    pub url: Option<Url>,
    /// User name presented to the storage server.
    pub username: Option<String>,
    /// Password presented to the storage server.
    pub password: Option<String>,
    /// Tenant the feed reports into.
    pub tenant_id: Option<String>,
    /// File that receives spooled notification payloads as JSON lines.
    pub spool_path: Option<Utf8PathBuf>,
}
