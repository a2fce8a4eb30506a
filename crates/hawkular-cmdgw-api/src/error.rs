//! Errors raised while framing gateway messages.

use thiserror::Error;

/// Failure to encode or decode a gateway frame.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame does not start with `Name=`.
    #[error("cannot decode message: missing or invalid message name in [{preview}]")]
    MissingName {
        /// Leading bytes of the frame, lossily decoded.
        preview: String,
    },
    /// The body after `Name=` is not a JSON value.
    #[error("cannot decode {name} body: {source}")]
    InvalidBody {
        /// Message name taken from the frame prefix.
        name: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A frame was decoded as the wrong message type.
    #[error("expected {expected} message but received {actual}")]
    UnexpectedName {
        /// Name the caller asked for.
        expected: &'static str,
        /// Name found in the frame.
        actual: String,
    },
    /// Serialising a message body failed.
    #[error("cannot encode {name}: {source}")]
    Encode {
        /// Message being encoded.
        name: String,
        /// Serialiser error.
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    pub(crate) fn missing_name(frame: &[u8]) -> Self {
        let head = frame.get(..frame.len().min(PREVIEW_LEN)).unwrap_or(frame);
        Self::MissingName {
            preview: String::from_utf8_lossy(head).into_owned(),
        }
    }
}

const PREVIEW_LEN: usize = 64;
