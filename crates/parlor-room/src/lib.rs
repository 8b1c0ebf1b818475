//! Room state for Parlor: the registry and its aggregates.
//!
//! [`RoomRegistry`] is the single source of truth for all room and game
//! state. It is deliberately *not* thread-safe by itself; it uses plain
//! maps and is meant to be owned by one task (or wrapped in one exclusive
//! lock) at a higher level, because its operations touch several fields
//! (player map, team lists, game state) that must change together.
//!
//! Every mutating operation returns a `Result`; referencing a missing room
//! or player is a no-op failure the caller must check, never a panic.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: create/look up/destroy rooms, all mutations
//! - [`Room`]: one room aggregate
//! - [`Player`], [`Team`], [`GameState`]: the pieces inside a room
//! - [`RoomError`]: what can go wrong

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{RemovalOutcome, RoomRegistry, SessionSummary};
pub use room::{GameState, Player, Room, Team};
