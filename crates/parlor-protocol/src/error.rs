//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed JSON, missing fields, wrong types).
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code with the wrong length or characters outside the
    /// unambiguous alphabet.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),
}
