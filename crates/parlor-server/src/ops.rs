//! Inbound message dispatch: one narrow function per protocol operation.
//!
//! Each function runs synchronously under the core lock, mutates through
//! the registry, and fans the result out per the visibility rules:
//! membership and lifecycle events to the whole room, move submissions to
//! the mover's teammates only, errors to the requester alone.

use std::time::{SystemTime, UNIX_EPOCH};

use parlor_protocol::{
    CellPos, ClientMessage, GameConfig, PlayerId, RoomCode, RoomMode,
    ServerMessage, TeamId,
};
use parlor_session::avatar_url;

use crate::scheduler;
use crate::server::{ServerCore, SharedState};

/// Routes one decoded client message.
pub(crate) fn dispatch(
    state: &SharedState,
    core: &mut ServerCore,
    sender: PlayerId,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::JoinRoom { room_id } => join_room(core, sender, &room_id),
        ClientMessage::LeaveRoom {} => leave_room(core, sender),
        ClientMessage::SelectTeam { team_id } => select_team(core, sender, team_id),
        ClientMessage::LeaveTeam {} => leave_team(core, sender),
        ClientMessage::Ready {} => set_ready(state, core, sender, true),
        ClientMessage::Unready {} => set_ready(state, core, sender, false),
        ClientMessage::ConfigGame(config) => config_game(core, sender, config),
        ClientMessage::StartGame {} => start_game(state, core, sender),
        ClientMessage::PlaceStone { position } => {
            place_stone(state, core, sender, position)
        }
        ClientMessage::SkipRound {} => skip_round(state, core, sender),
        ClientMessage::SwitchMode { mode } => switch_mode(core, sender, mode),
        ClientMessage::SetName { name } => set_name(core, sender, &name),
        ClientMessage::WebrtcSignal { target_id, signal } => {
            relay_signal(core, sender, target_id, signal)
        }
    }
}

fn send_error(core: &ServerCore, to: PlayerId, message: &str) {
    core.hub.send_to(
        to,
        ServerMessage::Error {
            message: message.to_string(),
        },
    );
}

/// Host gate for configuration, start, and mode switches. On failure the
/// requester gets an explicit error and nothing changes.
fn require_host(
    core: &ServerCore,
    sender: PlayerId,
    denial: &str,
) -> Option<RoomCode> {
    let code = core.sessions.room_of(sender)?;
    if core.registry.host_id(&code) == Some(sender) {
        Some(code)
    } else {
        send_error(core, sender, denial);
        None
    }
}

fn join_room(core: &mut ServerCore, sender: PlayerId, raw_code: &str) {
    let Ok(code) = RoomCode::parse(raw_code) else {
        send_error(core, sender, "Room not found");
        return;
    };
    if !core.registry.contains(&code) {
        send_error(core, sender, "Room not found");
        return;
    }

    let name = core
        .sessions
        .get(sender)
        .map(|s| s.name.clone())
        .unwrap_or_else(parlor_session::random_name);
    let avatar = avatar_url(&name);

    match core.registry.add_player(&code, sender, name, avatar) {
        Ok((snapshot, rejoined)) => {
            let _ = core.sessions.set_room(sender, Some(code.clone()));
            if rejoined {
                // Reconnect path: the room's record wins over whatever
                // provisional name this transport connected with.
                let _ = core.sessions.set_name(sender, snapshot.name.clone());
                core.sync_players(&code, &[sender]);
            } else {
                core.broadcast_room(
                    &code,
                    Some(sender),
                    &ServerMessage::PlayerJoined { player: snapshot },
                );
                core.sync_room(&code);
            }
        }
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn leave_room(core: &mut ServerCore, sender: PlayerId) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    let _ = core.sessions.set_room(sender, None);

    match core.registry.remove_player(&code, sender) {
        Ok(outcome) => {
            if outcome.destroyed {
                core.room_timers.cancel(&code);
            } else {
                core.broadcast_room(
                    &code,
                    None,
                    &ServerMessage::PlayerLeft { player_id: sender },
                );
                core.sync_room(&code);
            }
        }
        Err(e) => tracing::debug!(room = %code, player = %sender, error = %e, "leave failed"),
    }
}

fn select_team(core: &mut ServerCore, sender: PlayerId, team_id: TeamId) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    match core.registry.select_team(&code, sender, team_id) {
        Ok(()) => core.sync_room(&code),
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn leave_team(core: &mut ServerCore, sender: PlayerId) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    match core.registry.leave_team(&code, sender) {
        Ok(()) => core.sync_room(&code),
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn set_ready(
    state: &SharedState,
    core: &mut ServerCore,
    sender: PlayerId,
    ready: bool,
) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    if core.registry.set_ready(&code, sender, ready).is_err() {
        return;
    }
    core.sync_room(&code);

    // The last ready-up starts the game without waiting for the host.
    if ready && core.registry.start_game(&code).is_ok() {
        scheduler::launch_game(state, core, &code);
    }
}

fn config_game(core: &mut ServerCore, sender: PlayerId, config: GameConfig) {
    let Some(code) = require_host(core, sender, "Only the host can configure the game")
    else {
        return;
    };
    // A reconfiguration tears down the running game; its timer goes too.
    core.room_timers.cancel(&code);
    match core.registry.configure(&code, config) {
        Ok(_) => core.sync_room(&code),
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn start_game(state: &SharedState, core: &mut ServerCore, sender: PlayerId) {
    let Some(code) = require_host(core, sender, "Only the host can start the game")
    else {
        return;
    };
    match core.registry.start_game(&code) {
        Ok(()) => scheduler::launch_game(state, core, &code),
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn place_stone(
    state: &SharedState,
    core: &mut ServerCore,
    sender: PlayerId,
    position: CellPos,
) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    match core.registry.place_stone(&code, sender, position, epoch_ms()) {
        Ok(()) => {
            // Teammates only: opposing teams learn nothing, not even that
            // a submission happened.
            let mates = core.registry.teammates_of(&code, sender);
            core.sync_players(&code, &mates);
            scheduler::check_all_moved(state, core, &code);
        }
        Err(e) => {
            // Expected under simultaneous-move races; reject silently.
            tracing::debug!(room = %code, player = %sender, error = %e, "move rejected");
        }
    }
}

fn skip_round(state: &SharedState, core: &mut ServerCore, sender: PlayerId) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    // Skipping submits nothing; it just nudges the early-end check.
    scheduler::check_all_moved(state, core, &code);
}

fn switch_mode(core: &mut ServerCore, sender: PlayerId, mode: RoomMode) {
    let Some(code) = require_host(core, sender, "Only the host can switch modes")
    else {
        return;
    };
    match core.registry.switch_mode(&code, mode) {
        Ok(()) => {
            core.broadcast_room(&code, None, &ServerMessage::SwitchMode { mode });
            core.sync_room(&code);
        }
        Err(e) => send_error(core, sender, &e.to_string()),
    }
}

fn set_name(core: &mut ServerCore, sender: PlayerId, name: &str) {
    let trimmed: String = name.trim().chars().take(20).collect();
    if trimmed.is_empty() {
        return;
    }
    let _ = core.sessions.set_name(sender, trimmed.clone());

    if let Some(code) = core.sessions.room_of(sender) {
        let avatar = avatar_url(&trimmed);
        if core.registry.rename(&code, sender, &trimmed, avatar).is_ok() {
            core.sync_room(&code);
        }
    }
}

/// The signaling relay: forward the opaque blob to the target if they are
/// a member of the sender's room with a live connection; otherwise drop
/// it. No buffering, no retry; the peer layer above heals itself.
fn relay_signal(
    core: &ServerCore,
    sender: PlayerId,
    target: PlayerId,
    signal: serde_json::Value,
) {
    let Some(code) = core.sessions.room_of(sender) else {
        return;
    };
    if !core.registry.member_ids(&code).contains(&target) {
        return;
    }
    core.hub.send_to(
        target,
        ServerMessage::WebrtcSignal {
            from_id: sender,
            signal,
        },
    );
}

/// Grace-timer expiry: removes the player as if they had left. Re-checks
/// the session first; a reconnect that beat the timer makes this a
/// no-op.
pub(crate) fn expire_player(core: &mut ServerCore, id: PlayerId) {
    if !core.sessions.grace_elapsed(id) {
        return;
    }
    let room = core.sessions.room_of(id);
    core.sessions.remove(id);
    tracing::info!(player = %id, "grace period expired, removing player");

    let Some(code) = room else {
        return;
    };
    match core.registry.remove_player(&code, id) {
        Ok(outcome) => {
            if outcome.destroyed {
                core.room_timers.cancel(&code);
            } else {
                core.broadcast_room(
                    &code,
                    None,
                    &ServerMessage::PlayerLeft { player_id: id },
                );
                core.sync_room(&code);
            }
        }
        Err(e) => {
            tracing::debug!(room = %code, player = %id, error = %e, "expiry removal failed")
        }
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
