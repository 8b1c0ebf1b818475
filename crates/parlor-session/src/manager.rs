//! The session manager: every durable identity the server knows about.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself: plain `HashMap`, no
//! locking. It is owned by the connection layer and accessed under that
//! layer's exclusive lock, which keeps the identity table and the room
//! state it refers to consistent with each other.

use std::collections::HashMap;
use std::time::Instant;

use parlor_protocol::{PlayerId, RoomCode};

use crate::identity::random_name;
use crate::{Session, SessionConfig, SessionError, SessionState};

/// Result of presenting (or not presenting) an id on connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    pub player_id: PlayerId,
    pub name: String,
    /// `true` when a grace-period session was resumed: the caller must
    /// cancel the pending grace timer and skip the joined/left fanfare.
    pub is_reconnect: bool,
    /// The room the resumed identity is attributed to, if any.
    pub room: Option<RoomCode>,
}

/// Tracks all known player identities and their transport state.
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Handles first contact on a new transport connection.
    ///
    /// A presented id resumes its session only if that session is inside
    /// its grace window; ids of still-connected or never-seen sessions
    /// get a fresh identity instead (holding a token is only proof of
    /// identity for the slot it was issued for).
    pub fn connect(
        &mut self,
        presented: Option<PlayerId>,
        requested_name: Option<String>,
    ) -> ConnectOutcome {
        if let Some(id) = presented {
            if let Some(session) = self.sessions.get_mut(&id) {
                if matches!(session.state, SessionState::Grace { .. }) {
                    session.state = SessionState::Connected;
                    if let Some(name) = requested_name {
                        session.name = name;
                    }
                    tracing::info!(player = %id, "player reconnected within grace");
                    return ConnectOutcome {
                        player_id: id,
                        name: session.name.clone(),
                        is_reconnect: true,
                        room: session.room.clone(),
                    };
                }
            }
        }

        let player_id = PlayerId::generate();
        let name = requested_name.unwrap_or_else(random_name);
        self.sessions.insert(
            player_id,
            Session {
                player_id,
                name: name.clone(),
                room: None,
                state: SessionState::Connected,
            },
        );
        tracing::info!(player = %player_id, %name, "session created");
        ConnectOutcome {
            player_id,
            name,
            is_reconnect: false,
            room: None,
        }
    }

    /// Marks a player's transport as dropped and starts the grace clock.
    /// Returns the room the identity is attributed to; the caller holds
    /// the membership for that long and schedules the expiry timer.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the id is unknown.
    pub fn disconnect(
        &mut self,
        id: PlayerId,
    ) -> Result<Option<RoomCode>, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        session.state = SessionState::Grace {
            since: Instant::now(),
        };
        tracing::info!(player = %id, "transport dropped, grace period started");
        Ok(session.room.clone())
    }

    /// Whether a session's grace window has fully elapsed.
    ///
    /// The grace timer calls this when it fires instead of trusting its
    /// own schedule: a session that reconnected (or was already removed)
    /// answers `false` and the stale firing is a no-op.
    pub fn grace_elapsed(&self, id: PlayerId) -> bool {
        match self.sessions.get(&id).map(|s| s.state) {
            Some(SessionState::Grace { since }) => {
                since.elapsed() >= self.config.grace
            }
            _ => false,
        }
    }

    /// Forgets an identity entirely (grace elapsed, or an explicit leave
    /// with the transport already gone).
    pub fn remove(&mut self, id: PlayerId) {
        if self.sessions.remove(&id).is_some() {
            tracing::info!(player = %id, "session removed");
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Updates the room a session is attributed to.
    pub fn set_room(
        &mut self,
        id: PlayerId,
        room: Option<RoomCode>,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        session.room = room;
        Ok(())
    }

    pub fn room_of(&self, id: PlayerId) -> Option<RoomCode> {
        self.sessions.get(&id).and_then(|s| s.room.clone())
    }

    pub fn set_name(
        &mut self,
        id: PlayerId,
        name: String,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        session.name = name;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

// =========================================================================
// Tests
// =========================================================================
