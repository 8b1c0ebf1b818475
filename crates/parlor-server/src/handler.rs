//! Per-connection handling: upgrade, identity, message loop, heartbeat,
//! and the disconnect path that starts the grace period.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parlor_protocol::{ClientMessage, Codec, JsonCodec, PlayerId, ServerMessage};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::ops;
use crate::server::SharedState;

/// Server ping cadence. A connection that hasn't answered since the
/// previous ping is force-closed so its grace period starts promptly
/// instead of waiting for a TCP-level timeout.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Query parameters on the `/ws` upgrade request.
#[derive(Debug, Deserialize)]
pub(crate) struct ConnectQuery {
    /// A previously issued durable id, presented for reconnection.
    #[serde(rename = "playerId")]
    player_id: Option<String>,
    /// Preferred display name.
    name: Option<String>,
}

pub(crate) async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(socket: WebSocket, state: SharedState, query: ConnectQuery) {
    let presented = query.player_id.as_deref().and_then(PlayerId::parse);
    let requested_name: Option<String> = query
        .name
        .as_deref()
        .map(|n| n.trim().chars().take(20).collect::<String>())
        .filter(|n| !n.is_empty());

    let (tx, rx) = mpsc::unbounded_channel();

    // Resolve the identity and confirm it to the client in one locked
    // step, so no fan-out can slip in between registration and the
    // initial sync.
    let player_id = {
        let mut core = state.core.lock().await;
        let outcome = core.sessions.connect(presented, requested_name);
        if outcome.is_reconnect {
            core.grace_timers.cancel(&outcome.player_id);
        }
        core.hub.register(outcome.player_id, tx);

        let room = outcome.room.as_ref().and_then(|code| {
            core.registry.snapshot_for(code, Some(outcome.player_id))
        });
        core.hub.send_to(
            outcome.player_id,
            ServerMessage::StateSync {
                player_id: outcome.player_id,
                player_name: outcome.name.clone(),
                is_reconnect: outcome.is_reconnect,
                room,
            },
        );
        tracing::info!(
            player = %outcome.player_id,
            reconnect = outcome.is_reconnect,
            "websocket connected"
        );
        outcome.player_id
    };

    let alive = Arc::new(AtomicBool::new(true));
    let (sink, stream) = socket.split();

    let mut write_task = tokio::spawn(write_loop(sink, rx, alive.clone()));
    let mut read_task = tokio::spawn(read_loop(stream, state.clone(), player_id, alive));

    // Whichever half ends first (clean close, send failure, missed
    // heartbeat), tear the other down too.
    tokio::select! {
        _ = &mut write_task => read_task.abort(),
        _ = &mut read_task => write_task.abort(),
    }

    on_disconnect(&state, player_id).await;
}

/// Drains the outbound queue into the socket and drives the heartbeat.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    alive: Arc<AtomicBool>,
) {
    let codec = JsonCodec;
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(msg) = queued else { break };
                let Ok(bytes) = codec.encode(&msg) else { continue };
                let Ok(text) = String::from_utf8(bytes) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                // Nothing heard since the last ping: half-open, close it.
                if !alive.swap(false, Ordering::Relaxed) {
                    tracing::debug!("heartbeat missed, closing connection");
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Decodes inbound frames and dispatches them in arrival order. Malformed
/// frames are dropped; the connection stays open.
async fn read_loop(
    mut stream: SplitStream<WebSocket>,
    state: SharedState,
    player_id: PlayerId,
    alive: Arc<AtomicBool>,
) {
    let codec = JsonCodec;

    while let Some(frame) = stream.next().await {
        let Ok(frame) = frame else { break };
        alive.store(true, Ordering::Relaxed);

        let data = match frame {
            Message::Text(text) => text.as_bytes().to_vec(),
            Message::Binary(bytes) => bytes.to_vec(),
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Close(_) => break,
        };

        let msg: ClientMessage = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(player = %player_id, error = %e, "dropping malformed frame");
                continue;
            }
        };

        let mut core = state.core.lock().await;
        ops::dispatch(&state, &mut core, player_id, msg);
    }
}

/// Transport gone: unregister the sender and start the grace period if
/// the player is in a room (their membership, team, and ready state are
/// held until the timer fires or they come back). Players not in a room
/// are simply forgotten.
async fn on_disconnect(state: &SharedState, player_id: PlayerId) {
    let mut core = state.core.lock().await;
    core.hub.unregister(player_id);

    match core.sessions.disconnect(player_id) {
        Ok(Some(_room)) => {
            let grace = core.sessions.config().grace;
            let st = state.clone();
            core.grace_timers.schedule(player_id, grace, async move {
                let mut core = st.core.lock().await;
                ops::expire_player(&mut core, player_id);
            });
            tracing::info!(
                player = %player_id,
                grace_secs = grace.as_secs(),
                "disconnected, grace period started"
            );
        }
        Ok(None) => core.sessions.remove(player_id),
        Err(e) => {
            tracing::debug!(player = %player_id, error = %e, "disconnect bookkeeping failed")
        }
    }
}
