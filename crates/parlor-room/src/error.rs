//! Error types for the room layer.

use parlor_protocol::{GamePhase, PlayerId, RoomCode, TeamId};

/// Errors that can occur during room operations.
///
/// These map onto the protocol's client-facing taxonomy: `NotFound` and
/// the team/start errors are surfaced as `ERROR` messages, `InvalidMove`
/// is rejected silently (expected under simultaneous-move races), and
/// authorization ("host only") is checked a layer above, where the caller
/// identity is known.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (never created, or already torn down).
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The player is not a member of the room.
    #[error("player {0} not in room")]
    PlayerNotFound(PlayerId),

    /// The referenced team id is outside the current configuration.
    #[error("{0} not found")]
    TeamNotFound(TeamId),

    /// The team already has `players_per_team` members.
    #[error("{0} is full")]
    TeamFull(TeamId),

    /// Team membership cannot change during `playing`/`judging`.
    #[error("teams are locked while the game is {0}")]
    TeamsLocked(GamePhase),

    /// A readied player must unready before changing teams.
    #[error("cannot change team while readied")]
    AlreadyReady,

    /// Out-of-bounds cell, occupied cell, mover not seated, or wrong
    /// phase. Rejected without a broadcast.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The start check failed: not enough seated players, or not all of
    /// them readied. No side effects.
    #[error("need {required} seated and ready players to start (seated {seated}, ready {ready})")]
    NotReadyToStart {
        required: usize,
        seated: usize,
        ready: usize,
    },

    /// A scheduler-driven operation found the game in a different phase
    /// than the one it was scheduled for (e.g. a stale timer firing).
    #[error("operation requires phase {expected}, game is {actual}")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    /// The room has no game state configured.
    #[error("room has no game configured")]
    NoGame,
}
