//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A frame could not be parsed: malformed JSON, missing fields, or an
    /// unknown message type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but breaks protocol rules — e.g. the first frame
    /// of a connection was not `hello`, or the version doesn't match.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
