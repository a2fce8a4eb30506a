//! Text and binary framing of gateway messages.
//!
//! The text form is `Name=<json>`. The binary form is the text form followed
//! immediately by raw bytes; the end of the JSON value marks where the bytes
//! start.

use serde_json::{Deserializer, Map, Value};

use crate::error::CodecError;
use crate::message::{ApiMessage, MessageEnvelope};
use crate::types::Authentication;

const SEPARATOR: u8 = b'=';
const AUTHENTICATION: &str = "authentication";

/// A message whose type is known only by name.
///
/// Dispatchers route on [`RawMessage::name`] before choosing the concrete
/// type to decode into.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    name: String,
    body: Value,
    binary_data: Option<Vec<u8>>,
    carries_authentication: bool,
}

impl RawMessage {
    /// Builds a message from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, body: Value, binary_data: Option<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body,
            binary_data,
            carries_authentication: false,
        }
    }

    /// Serialises a typed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when the message cannot be serialised.
    pub fn from_envelope<M: ApiMessage>(envelope: MessageEnvelope<M>) -> Result<Self, CodecError> {
        let body = serde_json::to_value(&envelope.basic_message).map_err(|source| {
            CodecError::Encode {
                name: M::NAME.to_owned(),
                source,
            }
        })?;
        Ok(Self {
            name: M::NAME.to_owned(),
            body,
            binary_data: envelope.binary_data,
            carries_authentication: M::CARRIES_AUTHENTICATION,
        })
    }

    /// Serialises a typed message without binary data.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when the message cannot be serialised.
    pub fn from_message<M: ApiMessage>(message: M) -> Result<Self, CodecError> {
        Self::from_envelope(MessageEnvelope::new(message))
    }

    /// Wire name of the message.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// JSON body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Attached bytes.
    #[must_use]
    pub fn binary_data(&self) -> Option<&[u8]> {
        self.binary_data.as_deref()
    }

    /// Whether this message is `M`.
    #[must_use]
    pub fn is<M: ApiMessage>(&self) -> bool {
        self.name == M::NAME
    }

    /// Decodes the body as `M`, keeping the binary data.
    ///
    /// # Errors
    ///
    /// Fails when the name differs from `M::NAME` or the body does not match
    /// the shape of `M`.
    pub fn into_envelope<M: ApiMessage>(self) -> Result<MessageEnvelope<M>, CodecError> {
        if !self.is::<M>() {
            return Err(CodecError::UnexpectedName {
                expected: M::NAME,
                actual: self.name,
            });
        }
        let basic_message =
            serde_json::from_value(self.body).map_err(|source| CodecError::InvalidBody {
                name: self.name,
                source,
            })?;
        Ok(MessageEnvelope {
            basic_message,
            binary_data: self.binary_data,
        })
    }

    /// Sets `authentication` when the message carries one and it is absent.
    ///
    /// Returns whether the body changed.
    pub fn fill_authentication(&mut self, authentication: &Authentication) -> bool {
        if !self.carries_authentication {
            return false;
        }
        let Value::Object(fields) = &mut self.body else {
            return false;
        };
        if fields.get(AUTHENTICATION).is_some_and(|value| !value.is_null()) {
            return false;
        }
        match serde_json::to_value(authentication) {
            Ok(value) => {
                fields.insert(AUTHENTICATION.to_owned(), value);
                true
            }
            Err(_) => false,
        }
    }

    /// Renders the frame: text form plus any binary data.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = self.to_text().into_bytes();
        if let Some(bytes) = &self.binary_data {
            frame.extend_from_slice(bytes);
        }
        frame
    }

    /// Renders the text form, ignoring binary data.
    #[must_use]
    pub fn to_text(&self) -> String {
        format!("{}={}", self.name, self.body)
    }
}

/// Encodes a typed envelope into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when the message cannot be serialised.
pub fn encode<M: ApiMessage>(envelope: MessageEnvelope<M>) -> Result<Vec<u8>, CodecError> {
    RawMessage::from_envelope(envelope).map(|raw| raw.encode())
}

/// Splits a frame into name, JSON body, and trailing binary data.
///
/// A package-qualified name such as `org.hawkular.cmdgw.api.EchoRequest` is
/// reduced to its final component. A single line ending after the JSON body
/// is not treated as binary data; any other trailing bytes are.
///
/// # Errors
///
/// Fails when the frame has no `Name=` prefix or the body is not JSON.
pub fn decode(frame: &[u8]) -> Result<RawMessage, CodecError> {
    let separator = frame
        .iter()
        .position(|byte| *byte == SEPARATOR)
        .ok_or_else(|| CodecError::missing_name(frame))?;
    let qualified = frame
        .get(..separator)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .map(str::trim)
        .filter(|name| is_message_name(name))
        .ok_or_else(|| CodecError::missing_name(frame))?;
    let name = qualified.rsplit('.').next().unwrap_or(qualified).to_owned();

    let rest = frame.get(separator + 1..).unwrap_or_default();
    let mut values = Deserializer::from_slice(rest).into_iter::<Value>();
    let body = match values.next() {
        Some(Ok(value)) => value,
        Some(Err(source)) => return Err(CodecError::InvalidBody { name, source }),
        None => Value::Object(Map::new()),
    };
    let trailing = rest.get(values.byte_offset()..).unwrap_or_default();
    let binary_data = match trailing {
        [] | [b'\n'] | [b'\r', b'\n'] => None,
        bytes => Some(bytes.to_vec()),
    };
    Ok(RawMessage::new(name, body, binary_data))
}

/// Decodes a frame straight into `M`.
///
/// # Errors
///
/// See [`decode`] and [`RawMessage::into_envelope`].
pub fn decode_as<M: ApiMessage>(frame: &[u8]) -> Result<MessageEnvelope<M>, CodecError> {
    decode(frame)?.into_envelope()
}

fn is_message_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$'))
        })
}

#[cfg(test)]
mod tests;
