//! Player sessions for Parlor.
//!
//! A session is the server's record of a durable player identity: who they
//! are, which room they're attributed to, and whether their transport is
//! currently up. Identities survive transport drops; a disconnect starts
//! a grace period instead of removing the player, and presenting the same
//! id within the window resumes exactly where they left off:
//!
//! ```text
//!   connected ──(transport closed)──→ grace(deadline) ──(elapsed)──→ removed
//!       ↑                                  │
//!       └────────(same id presented)───────┘
//! ```
//!
//! The manager is plain data, owned and serialized by the connection
//! layer; the timer that fires at the deadline lives there too, and
//! re-checks [`SessionManager::grace_elapsed`] before acting.

mod error;
mod identity;
mod manager;
mod session;

pub use error::SessionError;
pub use identity::{avatar_url, random_name, RANDOM_NAMES};
pub use manager::{ConnectOutcome, SessionManager};
pub use session::{Session, SessionConfig, SessionState};
