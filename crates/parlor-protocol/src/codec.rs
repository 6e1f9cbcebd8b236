//! Message encoding: Rust types ↔ JSON text frames.
//!
//! The wire is plain JSON text (one message per WebSocket text frame), so
//! the codec works in `String`s rather than byte buffers. The [`Codec`]
//! trait keeps the serialization choice swappable without touching the
//! transport or router layers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to text frames and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses one text frame back into a value.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// The JSON [`Codec`] used by the server and every client.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
