//! The room registry: every room, every mutation, one owner.

use std::collections::HashMap;

use parlor_game::{apply_results, check_win, resolve_round, WinCheck};
use parlor_protocol::{
    CellPos, GameConfig, GamePhase, GameRecord, PlayerId, PlayerSnapshot,
    RoomCode, RoomMode, RoomSnapshot, RoundMove, RoundResult, TeamColor,
    TeamId, TeamSnapshot,
};

use crate::room::{build_teams, Room};
use crate::{GameState, RoomError};

/// What happened when a player was removed from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The removed player was the last one; the room is gone.
    pub destroyed: bool,
    /// Host duties moved to this player (the next in registration order).
    pub new_host: Option<PlayerId>,
}

/// Final report when a session's configured game count is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub history: Vec<GameRecord>,
    pub teams: Vec<TeamSnapshot>,
    /// Set only when exactly one team holds the strict maximum win count.
    pub final_winner: Option<TeamColor>,
}

/// Owns the map of room code → room aggregate.
///
/// Plain maps, no interior locking: the registry is serialized by whoever
/// owns it (see the crate docs). Cross-room operations don't interfere
/// with each other semantically, so a future sharding of the outer lock
/// needs no changes here.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------
    // Room lifecycle
    // -----------------------------------------------------------------

    /// Creates a room with the default configuration and returns its code.
    pub fn create_room(&mut self) -> RoomCode {
        let code = loop {
            let candidate = RoomCode::generate();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        self.rooms
            .insert(code.clone(), Room::new(code.clone(), GameConfig::default()));
        tracing::info!(room = %code, "room created");
        code
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Removes a room outright. Returns whether it existed.
    pub fn delete_room(&mut self, code: &RoomCode) -> bool {
        let existed = self.rooms.remove(code).is_some();
        if existed {
            tracing::info!(room = %code, "room destroyed");
        }
        existed
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Adds a player, or recognizes a returning member.
    ///
    /// The first player to join an empty room becomes host. Returns the
    /// player's snapshot and whether this was a rejoin (membership
    /// untouched: the reconnect path).
    pub fn add_player(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        name: String,
        avatar: String,
    ) -> Result<(PlayerSnapshot, bool), RoomError> {
        let room = self.room_mut(code)?;

        if let Some(existing) = room.players.get(&id) {
            return Ok((snapshot_of(existing), true));
        }

        let is_host = room.players.is_empty();
        let player = crate::Player {
            id,
            name,
            avatar,
            is_host,
            is_ready: false,
            team_id: None,
        };
        let snap = snapshot_of(&player);
        room.players.insert(id, player);
        room.join_order.push(id);
        if is_host {
            room.host_id = Some(id);
        }
        tracing::info!(
            room = %code,
            player = %id,
            members = room.players.len(),
            "player joined"
        );
        Ok((snap, false))
    }

    /// Removes a player as if they had left: frees their team slot,
    /// transfers host duties to the next player in registration order,
    /// and tears the room down when it empties.
    pub fn remove_player(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
    ) -> Result<RemovalOutcome, RoomError> {
        let room = self.room_mut(code)?;
        if !room.players.contains_key(&id) {
            return Err(RoomError::PlayerNotFound(id));
        }

        room.detach_from_team(id);
        let was_host = room.host_id == Some(id);
        room.players.remove(&id);
        room.join_order.retain(|p| *p != id);
        refresh_lobby_phase(room);

        tracing::info!(
            room = %code,
            player = %id,
            members = room.players.len(),
            "player left"
        );

        if room.players.is_empty() {
            self.delete_room(code);
            return Ok(RemovalOutcome {
                destroyed: true,
                new_host: None,
            });
        }

        let mut new_host = None;
        if was_host {
            // join_order is non-empty here; its head is the successor.
            let successor = room.join_order[0];
            if let Some(player) = room.players.get_mut(&successor) {
                player.is_host = true;
            }
            room.host_id = Some(successor);
            new_host = Some(successor);
            tracing::info!(room = %code, player = %successor, "host transferred");
        }

        Ok(RemovalOutcome {
            destroyed: false,
            new_host,
        })
    }

    // -----------------------------------------------------------------
    // Teams and readiness
    // -----------------------------------------------------------------

    /// Seats a player on a team, implicitly leaving their previous one.
    pub fn select_team(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        team_id: TeamId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let phase = lobby_phase(room);
        if phase.teams_locked() {
            return Err(RoomError::TeamsLocked(phase));
        }
        let player = room
            .players
            .get(&id)
            .ok_or(RoomError::PlayerNotFound(id))?;
        if player.is_ready {
            return Err(RoomError::AlreadyReady);
        }
        let already_on_it = player.team_id == Some(team_id);

        let per_team = room
            .game
            .as_ref()
            .map(|g| g.config.players_per_team as usize)
            .unwrap_or(2);
        let team = room
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or(RoomError::TeamNotFound(team_id))?;
        if !already_on_it && team.members.len() >= per_team {
            return Err(RoomError::TeamFull(team_id));
        }

        if !already_on_it {
            room.detach_from_team(id);
            if let Some(team) = room.team_mut(team_id) {
                team.members.push(id);
            }
            if let Some(player) = room.players.get_mut(&id) {
                player.team_id = Some(team_id);
            }
        }
        refresh_lobby_phase(room);
        Ok(())
    }

    /// Unseats a player (back to spectator).
    pub fn leave_team(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let phase = lobby_phase(room);
        if phase.teams_locked() {
            return Err(RoomError::TeamsLocked(phase));
        }
        let player = room
            .players
            .get(&id)
            .ok_or(RoomError::PlayerNotFound(id))?;
        if player.is_ready {
            return Err(RoomError::AlreadyReady);
        }
        room.detach_from_team(id);
        refresh_lobby_phase(room);
        Ok(())
    }

    pub fn set_ready(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        ready: bool,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let player = room
            .players
            .get_mut(&id)
            .ok_or(RoomError::PlayerNotFound(id))?;
        player.is_ready = ready;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Configuration and mode
    // -----------------------------------------------------------------

    /// Applies a new game configuration: teams are rebuilt from scratch,
    /// every player is unseated and un-readied, and a fresh game state
    /// replaces the old one (a reconfiguration starts a new session).
    pub fn configure(
        &mut self,
        code: &RoomCode,
        config: GameConfig,
    ) -> Result<GameConfig, RoomError> {
        let room = self.room_mut(code)?;
        let config = config.normalized();
        room.teams = build_teams(&config);
        for player in room.players.values_mut() {
            player.team_id = None;
            player.is_ready = false;
        }
        room.game = Some(GameState::new(config));
        tracing::info!(
            room = %code,
            players = config.player_count,
            per_team = config.players_per_team,
            games = config.total_games,
            "game reconfigured"
        );
        Ok(config)
    }

    pub fn switch_mode(
        &mut self,
        code: &RoomCode,
        mode: RoomMode,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        room.mode = mode;
        if mode == RoomMode::Game && room.game.is_none() {
            room.game = Some(GameState::new(GameConfig::default()));
            room.teams = build_teams(&GameConfig::default());
        }
        Ok(())
    }

    /// Renames a player (and refreshes their avatar, which derives from
    /// the name). Empty names are ignored; long ones are cut at 20 chars.
    pub fn rename(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        name: &str,
        avatar: String,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let player = room
            .players
            .get_mut(&id)
            .ok_or(RoomError::PlayerNotFound(id))?;
        let trimmed: String = name.trim().chars().take(20).collect();
        if trimmed.is_empty() {
            return Ok(());
        }
        player.name = trimmed;
        player.avatar = avatar;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Game flow
    // -----------------------------------------------------------------

    /// Starts the session's current game. Requires every seat filled and
    /// every seated player readied; fails without side effects otherwise.
    pub fn start_game(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let seated = room.seated_count();
        let ready = room.ready_count();
        let game = room.game.as_mut().ok_or(RoomError::NoGame)?;
        if !matches!(game.phase, GamePhase::Waiting | GamePhase::Ready) {
            return Err(RoomError::WrongPhase {
                expected: GamePhase::Ready,
                actual: game.phase,
            });
        }
        let required = game.config.player_count as usize;
        if seated != required || ready != required {
            return Err(RoomError::NotReadyToStart {
                required,
                seated,
                ready,
            });
        }
        game.phase = GamePhase::Playing;
        game.current_round = 1;
        room.mode = RoomMode::Game;
        tracing::info!(room = %code, players = required, "game started");
        Ok(())
    }

    /// Buffers a move for the current round. At most one pending move per
    /// player; resubmitting within the round replaces the earlier pick.
    ///
    /// Every rejection here is an [`RoomError::InvalidMove`]: expected
    /// under simultaneous-move races and handled silently by the caller.
    pub fn place_stone(
        &mut self,
        code: &RoomCode,
        id: PlayerId,
        position: CellPos,
        timestamp: u64,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(code)?;
        let team_id = room
            .players
            .get(&id)
            .and_then(|p| p.team_id)
            .ok_or_else(|| RoomError::InvalidMove("player not on a team".into()))?;
        let game = room.game.as_mut().ok_or(RoomError::NoGame)?;
        if game.phase != GamePhase::Playing {
            return Err(RoomError::InvalidMove(format!(
                "round is not running (phase {})",
                game.phase
            )));
        }
        if !parlor_game::Board::in_bounds(position) {
            return Err(RoomError::InvalidMove(format!(
                "cell [{}, {}] out of bounds",
                position[0], position[1]
            )));
        }
        // "Occupied" means occupied from a prior round; this round's
        // pending picks don't block each other.
        if !game.board.is_open(position) {
            return Err(RoomError::InvalidMove(format!(
                "cell [{}, {}] already occupied",
                position[0], position[1]
            )));
        }

        match game.pending_moves.iter_mut().find(|m| m.player_id == id) {
            Some(existing) => {
                existing.position = position;
                existing.team_id = team_id;
                existing.timestamp = timestamp;
            }
            None => game.pending_moves.push(RoundMove {
                player_id: id,
                team_id,
                position,
                timestamp,
            }),
        }
        Ok(())
    }

    /// Whether every seated player has a pending move this round.
    pub fn all_seated_moved(&self, code: &RoomCode) -> Result<bool, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let game = room.game.as_ref().ok_or(RoomError::NoGame)?;
        if game.phase != GamePhase::Playing {
            return Ok(false);
        }
        let seated = room.seated_count();
        Ok(seated > 0 && game.pending_moves.len() >= seated)
    }

    /// Judges the current round: resolves conflicts, commits winners to
    /// the board, bumps stone counts, and clears the pending buffer
    /// unconditionally. Flips the phase to `judging`.
    ///
    /// Refuses with [`RoomError::WrongPhase`] unless the round is
    /// actually running; this is the re-check that makes a stale round
    /// timer harmless.
    pub fn judge_round(
        &mut self,
        code: &RoomCode,
    ) -> Result<Vec<RoundResult>, RoomError> {
        let room = self.room_mut(code)?;
        let standings = room.standings();
        let Room { game, teams, .. } = room;
        let game = game.as_mut().ok_or(RoomError::NoGame)?;
        if game.phase != GamePhase::Playing {
            return Err(RoomError::WrongPhase {
                expected: GamePhase::Playing,
                actual: game.phase,
            });
        }
        game.phase = GamePhase::Judging;

        let results = resolve_round(&game.board, &game.pending_moves, &standings);
        apply_results(&mut game.board, &results);
        for result in &results {
            if let Some(color) = result.winner {
                if let Some(team) = teams.iter_mut().find(|t| t.color == color) {
                    team.stone_count += 1;
                }
            }
        }
        game.round_results = results.clone();
        game.pending_moves.clear();

        tracing::debug!(
            room = %code,
            round = game.current_round,
            cells = results.len(),
            "round judged"
        );
        Ok(results)
    }

    /// Win check over the current board.
    pub fn evaluate_win(&self, code: &RoomCode) -> Result<WinCheck, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let game = room.game.as_ref().ok_or(RoomError::NoGame)?;
        Ok(check_win(&game.board))
    }

    /// Records a finished game in the session history and credits the
    /// winning team.
    pub fn record_game_end(
        &mut self,
        code: &RoomCode,
        win: WinCheck,
    ) -> Result<GameRecord, RoomError> {
        let room = self.room_mut(code)?;
        let Room { game, teams, .. } = room;
        let game = game.as_mut().ok_or(RoomError::NoGame)?;
        let record = GameRecord {
            round_number: game.current_round,
            winner: win.winner,
            line_length: win.line_length,
        };
        game.history.push(record.clone());
        if let Some(color) = win.winner {
            if let Some(team) = teams.iter_mut().find(|t| t.color == color) {
                team.wins += 1;
            }
        }
        tracing::info!(
            room = %code,
            winner = ?win.winner,
            line = win.line_length,
            games_played = game.history.len(),
            "game concluded"
        );
        Ok(record)
    }

    /// Whether the session has played its configured number of games.
    pub fn session_complete(&self, code: &RoomCode) -> Result<bool, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let game = room.game.as_ref().ok_or(RoomError::NoGame)?;
        Ok(game.history.len() >= game.config.total_games as usize)
    }

    /// Ends the session: phase `ended`, final tallies reported. The
    /// overall winner requires a strict maximum; tied teams yield none.
    pub fn end_session(
        &mut self,
        code: &RoomCode,
    ) -> Result<SessionSummary, RoomError> {
        let room = self.room_mut(code)?;
        let game = room.game.as_mut().ok_or(RoomError::NoGame)?;
        game.phase = GamePhase::Ended;
        let history = game.history.clone();

        let max_wins = room.teams.iter().map(|t| t.wins).max().unwrap_or(0);
        let mut at_max = room.teams.iter().filter(|t| t.wins == max_wins);
        let final_winner = match (at_max.next(), at_max.next()) {
            (Some(team), None) => Some(team.color),
            _ => None,
        };

        tracing::info!(room = %code, winner = ?final_winner, "session ended");
        Ok(SessionSummary {
            history,
            teams: room
                .snapshot_for(None)
                .teams,
            final_winner,
        })
    }

    /// Moves from `judging` into the next round.
    pub fn advance_round(&mut self, code: &RoomCode) -> Result<u32, RoomError> {
        let room = self.room_mut(code)?;
        let game = room.game.as_mut().ok_or(RoomError::NoGame)?;
        if game.phase != GamePhase::Judging {
            return Err(RoomError::WrongPhase {
                expected: GamePhase::Judging,
                actual: game.phase,
            });
        }
        game.current_round += 1;
        game.pending_moves.clear();
        game.round_results.clear();
        game.phase = GamePhase::Playing;
        Ok(game.current_round)
    }

    /// Prepares the next game of the session: fresh board, zeroed stone
    /// counts, cleared ready flags, while keeping team membership,
    /// cumulative wins, and the session history.
    pub fn reset_for_next_game(
        &mut self,
        code: &RoomCode,
    ) -> Result<(usize, u8), RoomError> {
        let room = self.room_mut(code)?;
        let game = room.game.as_mut().ok_or(RoomError::NoGame)?;
        if game.phase != GamePhase::Judging {
            return Err(RoomError::WrongPhase {
                expected: GamePhase::Judging,
                actual: game.phase,
            });
        }
        let config = game.config;
        let history = std::mem::take(&mut game.history);
        let games_played = history.len();
        let mut fresh = GameState::new(config);
        fresh.history = history;
        room.game = Some(fresh);

        for team in &mut room.teams {
            team.stone_count = 0;
        }
        for player in room.players.values_mut() {
            player.is_ready = false;
        }
        refresh_lobby_phase(room);
        tracing::info!(room = %code, games_played, "next game prepared");
        Ok((games_played, config.total_games))
    }

    pub fn current_round(&self, code: &RoomCode) -> Result<u32, RoomError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let game = room.game.as_ref().ok_or(RoomError::NoGame)?;
        Ok(game.current_round)
    }

    // -----------------------------------------------------------------
    // Read-side helpers for the connection layer
    // -----------------------------------------------------------------

    /// Visibility-filtered serialization for one viewer (or an outside
    /// observer when `viewer` is `None`).
    pub fn snapshot_for(
        &self,
        code: &RoomCode,
        viewer: Option<PlayerId>,
    ) -> Option<RoomSnapshot> {
        self.rooms.get(code).map(|room| room.snapshot_for(viewer))
    }

    /// All member ids, in registration order. Empty if the room is gone.
    pub fn member_ids(&self, code: &RoomCode) -> Vec<PlayerId> {
        self.rooms
            .get(code)
            .map(|room| room.member_ids())
            .unwrap_or_default()
    }

    /// The mover's teammates (move submissions re-sync only these).
    pub fn teammates_of(&self, code: &RoomCode, id: PlayerId) -> Vec<PlayerId> {
        self.rooms
            .get(code)
            .map(|room| room.teammates_of(id))
            .unwrap_or_default()
    }

    pub fn host_id(&self, code: &RoomCode) -> Option<PlayerId> {
        self.rooms.get(code).and_then(|room| room.host_id)
    }

    fn room_mut(&mut self, code: &RoomCode) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The phase used for lobby-side gating (team/ready checks). A room with
/// no game state behaves as `waiting`.
fn lobby_phase(room: &Room) -> GamePhase {
    room.game
        .as_ref()
        .map(|g| g.phase)
        .unwrap_or(GamePhase::Waiting)
}

/// Keeps the waiting/ready distinction current while in the lobby:
/// `ready` exactly when every seat is filled. Never touches an active
/// or ended game.
fn refresh_lobby_phase(room: &mut Room) {
    let seated = room.seated_count();
    let Some(game) = room.game.as_mut() else {
        return;
    };
    if matches!(game.phase, GamePhase::Waiting | GamePhase::Ready) {
        game.phase = if seated == game.config.player_count as usize {
            GamePhase::Ready
        } else {
            GamePhase::Waiting
        };
    }
}

fn snapshot_of(player: &crate::Player) -> PlayerSnapshot {
    PlayerSnapshot {
        id: player.id,
        name: player.name.clone(),
        avatar: player.avatar.clone(),
        is_host: player.is_host,
        is_ready: player.is_ready,
        team_id: player.team_id,
    }
}
