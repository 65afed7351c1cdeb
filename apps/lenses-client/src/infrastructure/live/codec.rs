//! Live Stream Codec
//!
//! Decodes inbound WebSocket frames into [`LiveResponse`] values.
//!
//! The server sends one JSON object per text frame. Binary frames are
//! accepted when they carry UTF-8 JSON. A well-formed frame whose `type`
//! is not one of the known tags decodes to [`Decoded::Unknown`]; only
//! malformed frames are errors.

use serde::Deserialize;

use super::messages::{Data, LiveResponse, ResponseType};

/// Result of decoding a well-formed frame.
#[derive(Debug)]
pub enum Decoded {
    /// A message with a known type tag.
    Message(LiveResponse),
    /// A message whose type tag this client does not know.
    Unknown(String),
}

/// Envelope with the type tag left as text.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    typ: String,
    #[serde(default)]
    data: Data,
}

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary frame was not valid UTF-8.
    #[error("binary frame is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Frame was not a JSON object.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

/// JSON codec for the SQL execution stream.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a JSON object or does not match
    /// the message envelope.
    pub fn decode(&self, text: &str) -> Result<Decoded, CodecError> {
        let trimmed = text.trim();

        if !trimmed.starts_with('{') {
            let preview: String = trimmed.chars().take(50).collect();
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {preview}..."
            )));
        }

        let envelope: Envelope = serde_json::from_str(trimmed)?;
        Ok(match ResponseType::from_wire(&envelope.typ) {
            Some(typ) => Decoded::Message(LiveResponse {
                typ,
                data: envelope.data,
            }),
            None => Decoded::Unknown(envelope.typ),
        })
    }

    /// Decode a binary frame carrying UTF-8 JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not UTF-8 or fail [`Self::decode`].
    pub fn decode_bytes(&self, data: &[u8]) -> Result<Decoded, CodecError> {
        self.decode(std::str::from_utf8(data)?)
    }

    /// Encode a value to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode<T: serde::Serialize>(&self, value: &T) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }
}
