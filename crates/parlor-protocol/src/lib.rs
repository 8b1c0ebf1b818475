//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that the browser client and the
//! server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RoomSnapshot`],
//!   identity newtypes): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! The protocol layer sits below everything else. It knows nothing about
//! connections, rooms, or game rules, only the shape of the messages.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    CellPos, ClientMessage, GameConfig, GamePhase, GameRecord, GameSnapshot,
    PlayerId, PlayerSnapshot, RoomCode, RoomMode, RoomSnapshot, RoundMove,
    RoundResult, ServerMessage, TeamColor, TeamId, TeamSnapshot,
    ROOM_CODE_ALPHABET, ROOM_CODE_LEN,
};
