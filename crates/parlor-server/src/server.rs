//! Server state, builder, and the serve loop.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use parlor_protocol::{
    PlayerId, RoomCode, ServerMessage,
};
use parlor_room::RoomRegistry;
use parlor_session::{SessionConfig, SessionManager};
use parlor_timer::TimerArena;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::hub::ClientHub;
use crate::{handler, http, ServerError};

/// Everything that must change together, behind one exclusive lock.
///
/// Registry mutations touch several fields at once (player map, team
/// lists, game state) and the session table and hub must stay consistent
/// with them, so the whole core is serialized. No await point is ever
/// held inside the lock: outbound sends are non-blocking channel writes
/// and timer scheduling just spawns.
pub(crate) struct ServerCore {
    pub registry: RoomRegistry,
    pub sessions: SessionManager,
    pub hub: ClientHub,
    /// Per-room round/pause timer. A room has at most one pending timed
    /// transition at a time, so one slot per room is enough.
    pub room_timers: TimerArena<RoomCode>,
    /// Per-player disconnect grace timer.
    pub grace_timers: TimerArena<PlayerId>,
}

impl ServerCore {
    fn new(session_config: SessionConfig) -> Self {
        Self {
            registry: RoomRegistry::new(),
            sessions: SessionManager::new(session_config),
            hub: ClientHub::new(),
            room_timers: TimerArena::new(),
            grace_timers: TimerArena::new(),
        }
    }

    /// Sends each connected member their own visibility-filtered view of
    /// the room. This is the `STATE_SYNC` fan-out every mutation ends with.
    pub fn sync_room(&self, code: &RoomCode) {
        self.sync_players(code, &self.registry.member_ids(code));
    }

    /// Same as [`sync_room`](Self::sync_room) but only for `ids` (the
    /// teammate-only path for move submissions).
    pub fn sync_players(&self, code: &RoomCode, ids: &[PlayerId]) {
        for id in ids {
            let Some(snapshot) = self.registry.snapshot_for(code, Some(*id))
            else {
                continue;
            };
            let name = snapshot
                .players
                .iter()
                .find(|p| p.id == *id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            self.hub.send_to(
                *id,
                ServerMessage::StateSync {
                    player_id: *id,
                    player_name: name,
                    is_reconnect: false,
                    room: Some(snapshot),
                },
            );
        }
    }

    /// Queues an event message for every member of a room.
    pub fn broadcast_room(
        &self,
        code: &RoomCode,
        exclude: Option<PlayerId>,
        msg: &ServerMessage,
    ) {
        let members = self.registry.member_ids(code);
        self.hub.send_many(&members, exclude, msg);
    }
}

/// Immutable configuration plus the locked core.
pub(crate) struct AppState {
    pub core: Mutex<ServerCore>,
}

pub(crate) type SharedState = Arc<AppState>;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address for both the HTTP API and the WebSocket channel.
    pub bind_addr: String,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            session: SessionConfig::default(),
        }
    }
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ParlorServerBuilder {
    config: ServerConfig,
}

impl ParlorServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration (grace period).
    pub fn session_config(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Binds the listener and assembles the router.
    pub async fn build(self) -> Result<ParlorServer, ServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "listener bound");

        let state: SharedState = Arc::new(AppState {
            core: Mutex::new(ServerCore::new(self.config.session.clone())),
        });

        // The browser client may be served from elsewhere during
        // development, so the API routes answer cross-origin.
        let api = Router::new()
            .route("/api/room", post(http::create_room))
            .route("/api/room/{room_id}", get(http::get_room))
            .layer(CorsLayer::permissive());

        let router = Router::new()
            .merge(api)
            .route("/ws", get(handler::ws_upgrade))
            .with_state(state);

        Ok(ParlorServer { listener, router })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built Parlor server, ready to run.
pub struct ParlorServer {
    listener: TcpListener,
    router: Router,
}

impl ParlorServer {
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// The bound address (useful with port 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("parlor server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
