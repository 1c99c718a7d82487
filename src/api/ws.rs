//! `GET /ws/{sessionId}` (spec.md §6): the WebSocket upgrade entry point
//! into the Session Runtime state machine.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::{session_runtime, state::AppState};

pub async fn upgrade(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| session_runtime::handle(socket, session_id, state))
}
