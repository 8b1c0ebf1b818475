//! HTTP API endpoints: room creation and lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use parlor_protocol::{PlayerId, RoomCode};
use serde_json::json;

use crate::server::SharedState;

/// `POST /api/room`: creates a room and mints the prospective host's
/// durable player id. The room starts empty; whoever joins first over the
/// realtime channel (normally the creator, presenting this id) becomes
/// host.
pub(crate) async fn create_room(
    State(state): State<SharedState>,
) -> Json<serde_json::Value> {
    let mut core = state.core.lock().await;
    let code = core.registry.create_room();
    let host_id = PlayerId::generate();

    Json(json!({
        "success": true,
        "roomId": code.as_str(),
        "hostId": host_id,
        "joinUrl": format!("/room/{}", code.as_str()),
    }))
}

/// `GET /api/room/{roomId}`: the serialized room, or a 404. The lookup
/// is an outside view: in-flight round moves are never included.
pub(crate) async fn get_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Room not found" })),
        )
    };

    let code = RoomCode::parse(&room_id).map_err(|_| not_found())?;
    let core = state.core.lock().await;
    let snapshot = core.registry.snapshot_for(&code, None).ok_or_else(not_found)?;

    Ok(Json(json!({ "success": true, "room": snapshot })))
}
