//! # Parlor server
//!
//! The realtime session server behind the Parlor party-game platform:
//! short-code rooms hosting a video meeting plus a simultaneous-move team
//! variant of five-in-a-row.
//!
//! The crate ties the layers together: axum serves the room API and the
//! `/ws` channel; each connection gets a reader task and a writer task;
//! every mutation funnels through one exclusive lock around the room
//! registry, session table, and connection hub, so a room's state never
//! changes mid-handler. Round timing runs on cancellable per-room timers
//! whose handlers re-check the game phase before acting.

mod error;
mod handler;
mod http;
mod hub;
mod ops;
mod scheduler;
mod server;

pub use error::ServerError;
pub use server::{ParlorServer, ParlorServerBuilder, ServerConfig};
