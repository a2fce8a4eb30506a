//! Typed messages and the envelope that carries them.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::Authentication;

/// A message that can travel over the command gateway.
///
/// The wire name is the bare type name, for example `EchoRequest`.
pub trait ApiMessage: Serialize + DeserializeOwned {
    /// Name written before the `=` of the text form.
    const NAME: &'static str;

    /// Whether the body carries an `authentication` member that the gateway
    /// fills in when a command leaves it empty.
    const CARRIES_AUTHENTICATION: bool = false;

    /// Credentials attached to this message, if any.
    fn authentication(&self) -> Option<&Authentication> {
        None
    }
}

/// A decoded message together with its optional binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope<M> {
    /// The JSON part of the frame.
    pub basic_message: M,
    /// Bytes that followed the JSON part, for example an uploaded archive.
    pub binary_data: Option<Vec<u8>>,
}

impl<M> MessageEnvelope<M> {
    /// Wraps a message without binary data.
    pub const fn new(basic_message: M) -> Self {
        Self {
            basic_message,
            binary_data: None,
        }
    }

    /// Wraps a message followed by `binary_data`.
    pub const fn with_binary(basic_message: M, binary_data: Vec<u8>) -> Self {
        Self {
            basic_message,
            binary_data: Some(binary_data),
        }
    }
}
