//! Unified error type for the server crate.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_session::SessionError;

/// Top-level error wrapping the lower layers.
///
/// Nothing here is fatal to the process: connection handlers log and drop
/// these, affecting only the room or operation in question.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Binding or serving the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::{PlayerId, RoomCode};

    #[test]
    fn test_from_room_error() {
        let err: ServerError =
            RoomError::NotFound(RoomCode::parse("ABCDEF").unwrap()).into();
        assert!(matches!(err, ServerError::Room(_)));
        assert!(err.to_string().contains("ABCDEF"));
    }

    #[test]
    fn test_from_session_error() {
        let err: ServerError = SessionError::NotFound(PlayerId::generate()).into();
        assert!(matches!(err, ServerError::Session(_)));
    }
}
