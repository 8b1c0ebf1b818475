//! The round scheduler: server-authoritative round timing and the
//! round → judging → next-round / next-game / session-end sequencing.
//!
//! Everything here is a synchronous function over the locked core; the
//! async part is confined to the timer futures, which reacquire the lock
//! when they fire. Every timed transition re-checks the game phase at the
//! registry (via `WrongPhase` errors), so a timer that lost the race to
//! an early round end is a logged no-op, never a double judging.

use std::time::Duration;

use parlor_protocol::{RoomCode, ServerMessage};

use crate::server::{ServerCore, SharedState};

/// Pause between judging and the next round, so clients can animate the
/// results.
pub(crate) const NEXT_ROUND_PAUSE: Duration = Duration::from_secs(2);

/// Longer pause before the next game of the session.
pub(crate) const NEXT_GAME_PAUSE: Duration = Duration::from_secs(3);

/// Tiered round countdown: short early rounds, more thinking time once
/// the board fills up.
pub(crate) fn round_time(round: u32) -> Duration {
    let secs = match round {
        0..=5 => 5,
        6..=10 => 10,
        _ => 15,
    };
    Duration::from_secs(secs)
}

/// Starts (or restarts) the round clock for the room's current round and
/// announces `ROUND_START`.
pub(crate) fn begin_round(
    state: &SharedState,
    core: &mut ServerCore,
    code: &RoomCode,
) {
    let Ok(round) = core.registry.current_round(code) else {
        return;
    };
    let limit = round_time(round);

    let st = state.clone();
    let room = code.clone();
    core.room_timers.schedule(code.clone(), limit, async move {
        let mut core = st.core.lock().await;
        finish_round(&st, &mut core, &room);
    });

    core.broadcast_room(
        code,
        None,
        &ServerMessage::RoundStart {
            round,
            time_limit: limit.as_secs(),
        },
    );
}

/// Announces the game start and kicks off round 1. The caller has
/// already run the registry's start check.
pub(crate) fn launch_game(
    state: &SharedState,
    core: &mut ServerCore,
    code: &RoomCode,
) {
    core.broadcast_room(code, None, &ServerMessage::StartGame {});
    begin_round(state, core, code);
    core.sync_room(code);
}

/// Ends the current round: judges it, applies the outcome, and schedules
/// whatever comes next. Reached from the round timer *and* from the
/// everyone-has-moved early end, whichever happens first; the loser of
/// that race is rejected by the phase re-check inside `judge_round`.
pub(crate) fn finish_round(
    state: &SharedState,
    core: &mut ServerCore,
    code: &RoomCode,
) {
    // Kill the pending countdown in case we got here early.
    core.room_timers.cancel(code);

    let results = match core.registry.judge_round(code) {
        Ok(results) => results,
        Err(e) => {
            tracing::debug!(room = %code, error = %e, "round end skipped");
            return;
        }
    };
    core.broadcast_room(code, None, &ServerMessage::RoundEnd { results });

    let Ok(win) = core.registry.evaluate_win(code) else {
        return;
    };

    if win.ended {
        if core.registry.record_game_end(code, win).is_err() {
            return;
        }
        if core.registry.session_complete(code).unwrap_or(true) {
            if let Ok(summary) = core.registry.end_session(code) {
                core.broadcast_room(
                    code,
                    None,
                    &ServerMessage::GameEnd {
                        history: summary.history,
                        teams: summary.teams,
                        final_winner: summary.final_winner,
                    },
                );
            }
        } else {
            let st = state.clone();
            let room = code.clone();
            core.room_timers.schedule(code.clone(), NEXT_GAME_PAUSE, async move {
                let mut core = st.core.lock().await;
                start_next_game(&mut core, &room);
            });
        }
    } else {
        let st = state.clone();
        let room = code.clone();
        core.room_timers.schedule(code.clone(), NEXT_ROUND_PAUSE, async move {
            let mut core = st.core.lock().await;
            start_next_round(&st, &mut core, &room);
        });
    }

    core.sync_room(code);
}

/// Advances into the next round after the judging pause.
pub(crate) fn start_next_round(
    state: &SharedState,
    core: &mut ServerCore,
    code: &RoomCode,
) {
    if let Err(e) = core.registry.advance_round(code) {
        tracing::debug!(room = %code, error = %e, "next round skipped");
        return;
    }
    begin_round(state, core, code);
    core.sync_room(code);
}

/// Prepares the next game of the session after the inter-game pause:
/// fresh board, kept teams, everyone un-readied.
pub(crate) fn start_next_game(core: &mut ServerCore, code: &RoomCode) {
    let (games_played, total_games) = match core.registry.reset_for_next_game(code)
    {
        Ok(counts) => counts,
        Err(e) => {
            tracing::debug!(room = %code, error = %e, "next game skipped");
            return;
        }
    };
    core.broadcast_room(
        code,
        None,
        &ServerMessage::GameReset {
            games_played,
            total_games,
        },
    );
    core.sync_room(code);
}

/// Ends the round early once every seated player has a pending move.
pub(crate) fn check_all_moved(
    state: &SharedState,
    core: &mut ServerCore,
    code: &RoomCode,
) {
    if core.registry.all_seated_moved(code).unwrap_or(false) {
        finish_round(state, core, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_time_tiers() {
        assert_eq!(round_time(1), Duration::from_secs(5));
        assert_eq!(round_time(5), Duration::from_secs(5));
        assert_eq!(round_time(6), Duration::from_secs(10));
        assert_eq!(round_time(10), Duration::from_secs(10));
        assert_eq!(round_time(11), Duration::from_secs(15));
        assert_eq!(round_time(42), Duration::from_secs(15));
    }
}
