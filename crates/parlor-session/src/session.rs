//! Session data: what the server remembers about one player identity.

use std::time::{Duration, Instant};

use parlor_protocol::{PlayerId, RoomCode};

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a disconnected player's membership is preserved before
    /// they are removed as if they had left. One explicit value; the
    /// whole grace story hangs off this knob.
    pub grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(600),
        }
    }
}

/// Transport state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport is up.
    Connected,
    /// Transport dropped at `since`; the identity is held until
    /// `since + grace` unless the player comes back first.
    Grace { since: Instant },
}

/// One player's session.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    /// Current display name (provisional until the player sets one).
    pub name: String,
    /// The room this identity is attributed to, if any.
    pub room: Option<RoomCode>,
    pub state: SessionState,
}
