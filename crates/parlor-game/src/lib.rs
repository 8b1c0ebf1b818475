//! Team-gomoku game rules for Parlor.
//!
//! Everything in this crate is a pure function over plain data: the room
//! layer owns the state and decides *when* to judge a round; this crate
//! decides *what* the outcome is. Keeping it side-effect free is what makes
//! the determinism guarantee testable: resolving the same pending moves
//! against the same standings twice must yield identical results.
//!
//! # Key pieces
//!
//! - [`Board`]: the 15×15 grid and the longest-line scan
//! - [`resolve_round`]: per-cell conflict resolution with the
//!   three-stage tie-break
//! - [`apply_results`]: commit judged results to the board
//! - [`check_win`]: the strict-maximum win rule

mod board;
mod resolve;

pub use board::{Board, BOARD_SIZE, WIN_LENGTH};
pub use resolve::{apply_results, check_win, resolve_round, TeamStanding, WinCheck};
