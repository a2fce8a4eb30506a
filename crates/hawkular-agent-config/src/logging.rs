use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default tracing filter applied when neither the file nor the environment
/// provides one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output encodings understood by the agent's telemetry layer.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event.
    #[default]
    Json,
    /// Single-line human-readable events.
    Compact,
}

/// Error returned when a log format name is not recognised.
pub type LogFormatParseError = strum::ParseError;

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}
