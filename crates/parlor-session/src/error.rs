//! Error types for the session layer.

use parlor_protocol::PlayerId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given player.
    #[error("no session for player {0}")]
    NotFound(PlayerId),
}
