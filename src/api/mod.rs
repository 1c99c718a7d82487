//! HTTP surface (spec.md §6): multidata upload, the WebSocket upgrade
//! entry point, and the admin/ops endpoints consumed by core
//! (`events`, `player_forfeit`, `adminSend`, `log`, `players`).
//!
//! Router assembly follows the teacher's `routes::router()` shape
//! (flat `Router::new().route(...)` with a CORS layer on top), rebuilt
//! on `tower-http`'s `CorsLayer` rather than the teacher's hand-rolled
//! `middleware::cors::cors_layer` — the permissive any-origin/any-method
//! policy is the same, just expressed with the crate already on the
//! dependency list for it.

pub mod multidata;
pub mod session;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/multidata", post(multidata::upload))
        .route("/ws/:session_id", get(ws::upgrade))
        .route("/session/:session_id/events", get(session::events))
        .route(
            "/session/:session_id/player_forfeit",
            post(session::player_forfeit),
        )
        .route("/session/:session_id/adminSend", post(session::admin_send))
        .route("/session/:session_id/log", post(session::append_log))
        .route("/session/:session_id/players", get(session::players))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
