//! The room aggregate and the pieces inside it.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parlor_game::Board;
use parlor_protocol::{
    GameConfig, GamePhase, GameRecord, GameSnapshot, PlayerId, PlayerSnapshot,
    RoomCode, RoomMode, RoomSnapshot, RoundMove, RoundResult, TeamColor,
    TeamId, TeamSnapshot,
};

/// One member of a room.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub is_host: bool,
    pub is_ready: bool,
    /// `None` = spectator. Kept mutually consistent with the team's own
    /// member list by the registry.
    pub team_id: Option<TeamId>,
}

/// A colored group of players sharing a score.
#[derive(Debug, Clone)]
pub struct Team {
    pub id: TeamId,
    pub color: TeamColor,
    /// Member player ids, in join order.
    pub members: Vec<PlayerId>,
    /// Stones this team has on the board in the current game.
    pub stone_count: u32,
    /// Games won this session.
    pub wins: u32,
}

impl Team {
    fn snapshot(&self) -> TeamSnapshot {
        TeamSnapshot {
            id: self.id,
            color: self.color,
            players: self.members.clone(),
            stone_count: self.stone_count,
            wins: self.wins,
        }
    }
}

/// Builds the team set for a configuration: one team per color, colors
/// assigned in palette order.
pub(crate) fn build_teams(config: &GameConfig) -> Vec<Team> {
    (0..config.team_count())
        .map(|i| Team {
            id: TeamId(i),
            color: TeamColor::PALETTE[i as usize],
            members: Vec::new(),
            stone_count: 0,
            wins: 0,
        })
        .collect()
}

/// The board game's mutable state within a room.
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    /// 0 while waiting; 1-based once playing.
    pub current_round: u32,
    pub phase: GamePhase,
    pub config: GameConfig,
    /// Moves submitted this round, at most one per player (a resubmission
    /// replaces the earlier entry). Not yet on the board.
    pub pending_moves: Vec<RoundMove>,
    /// The most recent round's judged results.
    pub round_results: Vec<RoundResult>,
    /// Completed games this session.
    pub history: Vec<GameRecord>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::new(),
            current_round: 0,
            phase: GamePhase::Waiting,
            config,
            pending_moves: Vec::new(),
            round_results: Vec::new(),
            history: Vec::new(),
        }
    }

    fn snapshot(&self, visible_moves: Vec<RoundMove>) -> GameSnapshot {
        GameSnapshot {
            board: self.board.to_rows(),
            current_round: self.current_round,
            phase: self.phase,
            config: self.config,
            round_moves: visible_moves,
            round_results: self.round_results.clone(),
            game_history: self.history.clone(),
        }
    }
}

/// One room: a meeting/game session behind a shareable code.
#[derive(Debug, Clone)]
pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) host_id: Option<PlayerId>,
    pub(crate) players: HashMap<PlayerId, Player>,
    /// Registration order. Host transfer picks the next entry here, which
    /// keeps the choice deterministic (hash maps don't keep order).
    pub(crate) join_order: Vec<PlayerId>,
    pub(crate) teams: Vec<Team>,
    pub(crate) game: Option<GameState>,
    pub(crate) mode: RoomMode,
    /// Creation time, ms since the Unix epoch.
    pub(crate) created_at: u64,
}

impl Room {
    pub(crate) fn new(code: RoomCode, config: GameConfig) -> Self {
        Self {
            code,
            host_id: None,
            players: HashMap::new(),
            join_order: Vec::new(),
            teams: build_teams(&config),
            game: Some(GameState::new(config)),
            mode: RoomMode::Meeting,
            created_at: epoch_ms(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> Option<PlayerId> {
        self.host_id
    }

    pub fn mode(&self) -> RoomMode {
        self.mode
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Member ids in registration order.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.join_order.clone()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Players currently seated on a team.
    pub fn seated_count(&self) -> usize {
        self.teams.iter().map(|t| t.members.len()).sum()
    }

    /// Seated players who have readied up.
    pub fn ready_count(&self) -> usize {
        self.teams
            .iter()
            .flat_map(|t| t.members.iter())
            .filter(|id| self.players.get(*id).is_some_and(|p| p.is_ready))
            .count()
    }

    pub(crate) fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Detaches a player from whatever team they are on. Keeps the
    /// player's `team_id` and the team member list consistent.
    pub(crate) fn detach_from_team(&mut self, player_id: PlayerId) {
        let Some(team_id) = self.players.get(&player_id).and_then(|p| p.team_id)
        else {
            return;
        };
        if let Some(team) = self.team_mut(team_id) {
            team.members.retain(|id| *id != player_id);
        }
        if let Some(player) = self.players.get_mut(&player_id) {
            player.team_id = None;
        }
    }

    /// Teammates of a player (including the player), or just the player
    /// when they are a spectator.
    pub fn teammates_of(&self, player_id: PlayerId) -> Vec<PlayerId> {
        match self.players.get(&player_id).and_then(|p| p.team_id) {
            Some(team_id) => self
                .teams
                .iter()
                .find(|t| t.id == team_id)
                .map(|t| t.members.clone())
                .unwrap_or_default(),
            None => vec![player_id],
        }
    }

    /// Serializes the room for one specific viewer, applying the
    /// visibility rule: during `playing`, only the viewer's own team's
    /// pending moves are included (spectators and non-members see none).
    /// Every other phase is fully visible.
    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> RoomSnapshot {
        let game_state = self.game.as_ref().map(|game| {
            let visible_moves = if game.phase == GamePhase::Playing {
                let viewer_team =
                    viewer.and_then(|id| self.players.get(&id)).and_then(|p| p.team_id);
                match viewer_team {
                    Some(team_id) => game
                        .pending_moves
                        .iter()
                        .filter(|m| m.team_id == team_id)
                        .cloned()
                        .collect(),
                    None => Vec::new(),
                }
            } else {
                game.pending_moves.clone()
            };
            game.snapshot(visible_moves)
        });

        RoomSnapshot {
            id: self.code.clone(),
            host_id: self.host_id,
            players: self
                .join_order
                .iter()
                .filter_map(|id| self.players.get(id))
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    name: p.name.clone(),
                    avatar: p.avatar.clone(),
                    is_host: p.is_host,
                    is_ready: p.is_ready,
                    team_id: p.team_id,
                })
                .collect(),
            teams: self.teams.iter().map(Team::snapshot).collect(),
            game_state,
            mode: self.mode,
            created_at: self.created_at,
        }
    }

    /// Standings the conflict-resolution engine needs.
    pub(crate) fn standings(&self) -> Vec<parlor_game::TeamStanding> {
        self.teams
            .iter()
            .map(|t| parlor_game::TeamStanding {
                id: t.id,
                color: t.color,
                stone_count: t.stone_count,
            })
            .collect()
    }
}

pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
