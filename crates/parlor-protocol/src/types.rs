//! Core protocol types for Parlor's wire format.
//!
//! Every message on the realtime channel is a `{ "type": ..., "payload": ... }`
//! envelope with a SCREAMING_SNAKE_CASE tag, because that is what the browser
//! client parses. The serde attributes below are load-bearing: a renamed field
//! here is a broken client there, which is why the tests at the bottom pin the
//! exact JSON shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A durable player identity.
///
/// Issued on first contact and presented by the client on reconnect, so it
/// doubles as the reconnection token: whoever holds this id *is* that player.
/// A v4 UUID gives 122 random bits: unguessable, which is the entire
/// authorization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    /// Mints a fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parses an id a client presented (e.g. from a query parameter).
    pub fn parse(value: &str) -> Option<Self> {
        uuid::Uuid::parse_str(value).ok().map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Number of characters in a room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Alphabet for room codes. Visually ambiguous glyphs (`0/O`, `1/I`) are
/// excluded so codes survive being read aloud or scribbled on paper.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A six-character shareable room code.
///
/// Stored uppercase; [`RoomCode::parse`] accepts lowercase input because
/// people type codes however they like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Parses and normalizes a code: uppercase, exactly
    /// [`ROOM_CODE_LEN`] characters, all from [`ROOM_CODE_ALPHABET`].
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        let upper = value.trim().to_ascii_uppercase();
        if upper.len() != ROOM_CODE_LEN
            || !upper.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
        {
            return Err(ProtocolError::InvalidRoomCode(value.to_string()));
        }
        Ok(Self(upper))
    }

    /// Generates a random code. With a 32-character alphabet and 6 positions
    /// there are 32^6 ≈ 1.07 billion codes; collisions are checked by the
    /// registry anyway.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let i = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[i] as char
            })
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> String {
        code.0
    }
}

/// A team's numeric id within a room (0-based, in creation order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u8);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// A board cell as `[row, col]`.
pub type CellPos = [usize; 2];

/// Team colors, assigned in creation order from this fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl TeamColor {
    /// The palette, in assignment order. One team per color.
    pub const PALETTE: [TeamColor; 4] = [
        TeamColor::Red,
        TeamColor::Blue,
        TeamColor::Green,
        TeamColor::Yellow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
            TeamColor::Green => "green",
            TeamColor::Yellow => "yellow",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the board game. The single authority for "what is allowed
/// right now"; handlers check this, not scattered booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Configuring / team-forming.
    Waiting,
    /// Capacity filled, not everyone readied yet.
    Ready,
    /// Round clock running, moves being buffered.
    Playing,
    /// Momentary: conflict resolution in progress.
    Judging,
    /// Final game of the session concluded.
    Ended,
}

impl GamePhase {
    /// Whether team membership may change in this phase.
    pub fn teams_locked(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Judging)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GamePhase::Waiting => "waiting",
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::Judging => "judging",
            GamePhase::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// What the room is currently being used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomMode {
    Meeting,
    Game,
}

/// Host-chosen game settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Total seated capacity: 4 or 8.
    pub player_count: u8,
    /// Players per team: 2 or 4. A 4-player game forces 2.
    pub players_per_team: u8,
    /// Games in the session: 1–10.
    pub total_games: u8,
}

impl GameConfig {
    /// Clamps every field into its valid range. A 4-player game only
    /// divides into 2-player teams, so `players_per_team` is forced there.
    pub fn normalized(mut self) -> Self {
        if self.player_count != 8 {
            self.player_count = 4;
        }
        if self.players_per_team != 4 || self.player_count == 4 {
            self.players_per_team = 2;
        }
        self.total_games = self.total_games.clamp(1, 10);
        self
    }

    /// Number of teams this configuration produces.
    pub fn team_count(&self) -> u8 {
        self.player_count / self.players_per_team
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 4,
            players_per_team: 2,
            total_games: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Round data
// ---------------------------------------------------------------------------

/// A pending move submitted during a round. Buffered, not yet on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMove {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub position: CellPos,
    /// Submission time, ms since the Unix epoch. Ordering only; a later
    /// resubmission by the same player replaces the earlier one.
    pub timestamp: u64,
}

/// The judged outcome for one cell after a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub position: CellPos,
    pub winner: Option<TeamColor>,
    pub contested: bool,
    /// Human-readable reason tag, shown by the client in the judging
    /// animation.
    pub message: String,
}

/// One completed game within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// The round in which the game ended.
    pub round_number: u32,
    pub winner: Option<TeamColor>,
    pub line_length: usize,
}

// ---------------------------------------------------------------------------
// Snapshots (what STATE_SYNC carries)
// ---------------------------------------------------------------------------

/// A player as serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub is_host: bool,
    pub is_ready: bool,
    /// `None` = spectator.
    pub team_id: Option<TeamId>,
}

/// A team as serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub id: TeamId,
    pub color: TeamColor,
    pub players: Vec<PlayerId>,
    pub stone_count: u32,
    pub wins: u32,
}

/// Point-in-time game state as serialized to one specific viewer.
///
/// During the `playing` phase, `round_moves` has already been filtered to
/// the viewer's own team before this struct is built; opposing picks stay
/// invisible until judging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Vec<Vec<Option<TeamColor>>>,
    pub current_round: u32,
    pub phase: GamePhase,
    pub config: GameConfig,
    pub round_moves: Vec<RoundMove>,
    pub round_results: Vec<RoundResult>,
    pub game_history: Vec<GameRecord>,
}

/// A room as serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomCode,
    pub host_id: Option<PlayerId>,
    pub players: Vec<PlayerSnapshot>,
    pub teams: Vec<TeamSnapshot>,
    pub game_state: Option<GameSnapshot>,
    pub mode: RoomMode,
    /// Creation time, ms since the Unix epoch.
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Everything a client can send.
///
/// `#[serde(tag = "type", content = "payload")]` produces the adjacently
/// tagged envelope the client speaks:
/// `{ "type": "PLACE_STONE", "payload": { "position": [7, 7] } }`.
/// Variants without fields still carry an (empty) payload object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Join (or, after a reconnect, rejoin) a room by code. The code is
    /// carried as a raw string so that a malformed one can be answered
    /// with a proper error instead of a dropped frame.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },
    LeaveRoom {},
    #[serde(rename_all = "camelCase")]
    SelectTeam { team_id: TeamId },
    LeaveTeam {},
    Ready {},
    Unready {},
    /// Host only. The payload is the new [`GameConfig`].
    ConfigGame(GameConfig),
    /// Host only.
    StartGame {},
    PlaceStone { position: CellPos },
    SkipRound {},
    /// Host only.
    SwitchMode { mode: RoomMode },
    SetName { name: String },
    /// Opaque peer-video signaling, relayed verbatim to `target_id`.
    #[serde(rename_all = "camelCase")]
    WebrtcSignal {
        target_id: PlayerId,
        signal: serde_json::Value,
    },
}

/// Everything the server can send.
///
/// `STATE_SYNC` is the source of truth; the event-shaped messages exist so
/// clients can animate transitions without diffing snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    StateSync {
        player_id: PlayerId,
        player_name: String,
        is_reconnect: bool,
        /// Absent on the initial identity-confirmation sync (before the
        /// client has joined a room).
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        room: Option<RoomSnapshot>,
    },
    PlayerJoined { player: PlayerSnapshot },
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },
    StartGame {},
    #[serde(rename_all = "camelCase")]
    RoundStart { round: u32, time_limit: u64 },
    RoundEnd { results: Vec<RoundResult> },
    #[serde(rename_all = "camelCase")]
    GameEnd {
        history: Vec<GameRecord>,
        teams: Vec<TeamSnapshot>,
        final_winner: Option<TeamColor>,
    },
    #[serde(rename_all = "camelCase")]
    GameReset {
        games_played: usize,
        total_games: u8,
    },
    SwitchMode { mode: RoomMode },
    Error { message: String },
    #[serde(rename_all = "camelCase")]
    WebrtcSignal {
        from_id: PlayerId,
        signal: serde_json::Value,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these exact JSON shapes. A serde attribute
    //! change that alters a tag or field name breaks it silently, so the
    //! shapes are pinned here.

    use super::*;

    fn pid() -> PlayerId {
        PlayerId::parse("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap()
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&pid()).unwrap();
        assert_eq!(json, "\"6ba7b810-9dad-11d1-80b4-00c04fd430c8\"");
    }

    #[test]
    fn test_player_id_generate_is_unique() {
        assert_ne!(PlayerId::generate(), PlayerId::generate());
    }

    #[test]
    fn test_player_id_parse_rejects_garbage() {
        assert!(PlayerId::parse("not-a-uuid").is_none());
    }

    #[test]
    fn test_room_code_parse_normalizes_case() {
        let code = RoomCode::parse("abcdef").unwrap();
        assert_eq!(code.as_str(), "ABCDEF");
    }

    #[test]
    fn test_room_code_parse_rejects_wrong_length() {
        assert!(RoomCode::parse("ABC").is_err());
        assert!(RoomCode::parse("ABCDEFG").is_err());
    }

    #[test]
    fn test_room_code_parse_rejects_ambiguous_glyphs() {
        // 0, O, 1, I are not in the alphabet.
        assert!(RoomCode::parse("ABCDE0").is_err());
        assert!(RoomCode::parse("ABCDEO").is_err());
        assert!(RoomCode::parse("ABCDE1").is_err());
        assert!(RoomCode::parse("ABCDEI").is_err());
    }

    #[test]
    fn test_room_code_generate_is_valid() {
        for _ in 0..50 {
            let code = RoomCode::generate();
            assert!(RoomCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn test_room_code_deserializes_with_normalization() {
        let code: RoomCode = serde_json::from_str("\"abcdef\"").unwrap();
        assert_eq!(code.as_str(), "ABCDEF");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let code = RoomCode::parse("QWERTY").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"QWERTY\"");
    }

    // =====================================================================
    // Game vocabulary
    // =====================================================================

    #[test]
    fn test_team_color_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TeamColor::Red).unwrap(),
            "\"red\""
        );
        assert_eq!(
            serde_json::to_string(&TeamColor::Yellow).unwrap(),
            "\"yellow\""
        );
    }

    #[test]
    fn test_game_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GamePhase::Judging).unwrap(),
            "\"judging\""
        );
    }

    #[test]
    fn test_game_phase_teams_locked() {
        assert!(!GamePhase::Waiting.teams_locked());
        assert!(!GamePhase::Ready.teams_locked());
        assert!(GamePhase::Playing.teams_locked());
        assert!(GamePhase::Judging.teams_locked());
        assert!(!GamePhase::Ended.teams_locked());
    }

    #[test]
    fn test_game_config_default() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.player_count, 4);
        assert_eq!(cfg.players_per_team, 2);
        assert_eq!(cfg.total_games, 3);
        assert_eq!(cfg.team_count(), 2);
    }

    #[test]
    fn test_game_config_normalized_forces_pairs_for_four_players() {
        let cfg = GameConfig {
            player_count: 4,
            players_per_team: 4,
            total_games: 3,
        }
        .normalized();
        assert_eq!(cfg.players_per_team, 2);
    }

    #[test]
    fn test_game_config_normalized_clamps_games() {
        let cfg = GameConfig {
            player_count: 8,
            players_per_team: 4,
            total_games: 0,
        }
        .normalized();
        assert_eq!(cfg.total_games, 1);

        let cfg = GameConfig {
            player_count: 8,
            players_per_team: 4,
            total_games: 99,
        }
        .normalized();
        assert_eq!(cfg.total_games, 10);
    }

    #[test]
    fn test_game_config_normalized_rejects_odd_capacity() {
        let cfg = GameConfig {
            player_count: 6,
            players_per_team: 2,
            total_games: 3,
        }
        .normalized();
        assert_eq!(cfg.player_count, 4);
    }

    #[test]
    fn test_game_config_eight_by_four_has_two_teams() {
        let cfg = GameConfig {
            player_count: 8,
            players_per_team: 4,
            total_games: 1,
        }
        .normalized();
        assert_eq!(cfg.team_count(), 2);
    }

    #[test]
    fn test_game_config_wire_field_names() {
        let json: serde_json::Value =
            serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["playerCount"], 4);
        assert_eq!(json["playersPerTeam"], 2);
        assert_eq!(json["totalGames"], 3);
    }

    // =====================================================================
    // Envelopes: one shape test per tag the client depends on
    // =====================================================================

    #[test]
    fn test_client_join_room_decodes() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"JOIN_ROOM","payload":{"roomId":"abc234"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                room_id: "abc234".into()
            }
        );
    }

    #[test]
    fn test_client_place_stone_decodes() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"PLACE_STONE","payload":{"position":[7,8]}}"#,
        )
        .unwrap();
        assert_eq!(msg, ClientMessage::PlaceStone { position: [7, 8] });
    }

    #[test]
    fn test_client_ready_decodes_with_empty_payload() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"READY","payload":{}}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ready {});
    }

    #[test]
    fn test_client_config_game_payload_is_the_config() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"CONFIG_GAME","payload":{"playerCount":8,"playersPerTeam":4,"totalGames":5}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::ConfigGame(GameConfig {
                player_count: 8,
                players_per_team: 4,
                total_games: 5,
            })
        );
    }

    #[test]
    fn test_client_webrtc_signal_keeps_blob_opaque() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"WEBRTC_SIGNAL","payload":{"targetId":"6ba7b810-9dad-11d1-80b4-00c04fd430c8","signal":{"sdp":"v=0","type":"offer"}}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::WebrtcSignal { target_id, signal } => {
                assert_eq!(target_id, pid());
                assert_eq!(signal["type"], "offer");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_client_unknown_tag_fails_to_decode() {
        let result: Result<ClientMessage, _> = serde_json::from_str(
            r#"{"type":"FLY_TO_MOON","payload":{}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_server_state_sync_shape() {
        let msg = ServerMessage::StateSync {
            player_id: pid(),
            player_name: "Roy Green".into(),
            is_reconnect: false,
            room: None,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "STATE_SYNC");
        assert_eq!(
            json["payload"]["playerId"],
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        );
        assert_eq!(json["payload"]["playerName"], "Roy Green");
        assert_eq!(json["payload"]["isReconnect"], false);
        // `room` is omitted entirely when None, not serialized as null.
        assert!(json["payload"].get("room").is_none());
    }

    #[test]
    fn test_server_round_start_shape() {
        let msg = ServerMessage::RoundStart {
            round: 3,
            time_limit: 5,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ROUND_START");
        assert_eq!(json["payload"]["round"], 3);
        assert_eq!(json["payload"]["timeLimit"], 5);
    }

    #[test]
    fn test_server_round_end_carries_results() {
        let msg = ServerMessage::RoundEnd {
            results: vec![RoundResult {
                position: [3, 3],
                winner: Some(TeamColor::Blue),
                contested: true,
                message: "blue claims [3, 3] (fewest stones)".into(),
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ROUND_END");
        assert_eq!(json["payload"]["results"][0]["winner"], "blue");
        assert_eq!(json["payload"]["results"][0]["contested"], true);
        assert_eq!(
            json["payload"]["results"][0]["position"],
            serde_json::json!([3, 3])
        );
    }

    #[test]
    fn test_server_game_end_shape() {
        let msg = ServerMessage::GameEnd {
            history: vec![GameRecord {
                round_number: 9,
                winner: Some(TeamColor::Red),
                line_length: 6,
            }],
            teams: vec![],
            final_winner: Some(TeamColor::Red),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "GAME_END");
        assert_eq!(json["payload"]["finalWinner"], "red");
        assert_eq!(json["payload"]["history"][0]["lineLength"], 6);
        assert_eq!(json["payload"]["history"][0]["roundNumber"], 9);
    }

    #[test]
    fn test_server_player_left_shape() {
        let msg = ServerMessage::PlayerLeft { player_id: pid() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "PLAYER_LEFT");
        assert_eq!(
            json["payload"]["playerId"],
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        );
    }

    #[test]
    fn test_room_snapshot_wire_field_names() {
        let snapshot = RoomSnapshot {
            id: RoomCode::parse("ABC234").unwrap(),
            host_id: Some(pid()),
            players: vec![PlayerSnapshot {
                id: pid(),
                name: "Roy Green".into(),
                avatar: "https://example.test/a.png".into(),
                is_host: true,
                is_ready: false,
                team_id: Some(TeamId(0)),
            }],
            teams: vec![TeamSnapshot {
                id: TeamId(0),
                color: TeamColor::Red,
                players: vec![pid()],
                stone_count: 2,
                wins: 1,
            }],
            game_state: None,
            mode: RoomMode::Meeting,
            created_at: 1_700_000_000_000,
        };
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["id"], "ABC234");
        assert_eq!(json["hostId"], "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        assert_eq!(json["players"][0]["isHost"], true);
        assert_eq!(json["players"][0]["isReady"], false);
        assert_eq!(json["players"][0]["teamId"], 0);
        assert_eq!(json["teams"][0]["stoneCount"], 2);
        assert_eq!(json["mode"], "meeting");
        assert_eq!(json["createdAt"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_round_move_round_trip() {
        let mv = RoundMove {
            player_id: pid(),
            team_id: TeamId(1),
            position: [14, 0],
            timestamp: 12345,
        };
        let bytes = serde_json::to_vec(&mv).unwrap();
        let decoded: RoundMove = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(mv, decoded);
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_slice(b"not json at all");
        assert!(result.is_err());
    }
}
