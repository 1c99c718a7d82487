//! `/session/{id}/*` endpoints (spec.md §6) — not core, but consumed by
//! it: event history for external tooling, admin-triggered forfeits and
//! item sends, free-form client log lines, and the player roster.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{self, Auth},
    database::{
        entities::{mwsessions, users},
        interface::{
            events as event_store, logs as log_store, sessions as session_store,
        },
    },
    error::{AppError, AppResult},
    events::{EventData, EventType},
    item_router,
    session_runtime::wire::WireEvent,
    state::AppState,
};

async fn load_session(state: &AppState, session_id: Uuid) -> AppResult<mwsessions::Model> {
    session_store::find_by_id(&state.db, session_id)
        .await?
        .ok_or(AppError::SessionNotFound)
}

async fn require_participant(
    state: &AppState,
    session: &mwsessions::Model,
    user: &users::Model,
) -> AppResult<()> {
    if auth::allowed(&state.db, &state.config, session, user).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

async fn require_owner(
    state: &AppState,
    session: &mwsessions::Model,
    user: &users::Model,
) -> AppResult<()> {
    if user.is_superuser || session_store::is_owner(&state.db, session.id, user.id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_limit() -> u64 {
    500
}

pub async fn events(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
    Auth(user): Auth,
) -> AppResult<Json<Vec<WireEvent>>> {
    let session = load_session(&state, session_id).await?;
    require_participant(&state, &session, &user).await?;

    let events = event_store::events_for_session(&state.db, session_id, query.skip, query.limit)
        .await?;
    Ok(Json(events.iter().map(WireEvent::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct PlayerForfeitRequest {
    pub player_id: i32,
}

/// Marks `player_id` as forfeited. Self-forfeit is always allowed for the
/// slot's linked user; otherwise the caller must be an owner or superuser.
pub async fn player_forfeit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Auth(user): Auth,
    Json(body): Json<PlayerForfeitRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let session = load_session(&state, session_id).await?;

    let is_self = session_store::find_link_by_player(&state.db, session_id, body.player_id)
        .await?
        .is_some_and(|link| link.user_id == user.id);

    if !is_self {
        require_owner(&state, &session, &user).await?;
    }

    let event = event_store::append(
        &state.db,
        session_id,
        body.player_id,
        body.player_id,
        None,
        None,
        None,
        EventType::PlayerForfeit,
        None,
        EventData::default(),
    )
    .await?;
    state.fanout.publish(session_id, event);

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct AdminSendRequest {
    pub to_player: i32,
    pub item_id: i64,
    #[serde(default)]
    pub location_id: Option<i64>,
}

/// Owner/superuser-only: sends `item_id` to `to_player` outside the
/// normal finder pipeline, allocating a fresh `toPlayerIdx` the same way
/// the Item Router does for a cross-player find.
pub async fn admin_send(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Auth(user): Auth,
    Json(body): Json<AdminSendRequest>,
) -> AppResult<Json<WireEvent>> {
    let session = load_session(&state, session_id).await?;
    require_owner(&state, &session, &user).await?;

    let event = item_router::admin_send(
        &state.db,
        session_id,
        body.to_player,
        body.item_id,
        body.location_id,
    )
    .await?;

    state.fanout.publish(session_id, event.clone());
    Ok(Json(WireEvent::from(&event)))
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub level: String,
    pub message: String,
}

pub async fn append_log(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Auth(user): Auth,
    Json(body): Json<LogRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let session = load_session(&state, session_id).await?;
    require_participant(&state, &session, &user).await?;

    log_store::append(&state.db, Some(session_id), body.level, body.message).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub player_id: i32,
    pub name: String,
    pub user_id: Option<i32>,
    pub connected: bool,
}

pub async fn players(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Auth(user): Auth,
) -> AppResult<Json<Vec<PlayerSummary>>> {
    let session = load_session(&state, session_id).await?;
    require_participant(&state, &session, &user).await?;

    let mut summaries = Vec::with_capacity(session.multidata.player_names.len());
    for (idx, name) in session.multidata.player_names.iter().enumerate() {
        let player_id = (idx + 1) as i32;

        let link = session_store::find_link_by_player(&state.db, session_id, player_id).await?;
        let connected = event_store::connection_events(&state.db, session_id, player_id)
            .await?
            .first()
            .is_some_and(|event| event.event_type == EventType::PlayerJoin);

        summaries.push(PlayerSummary {
            player_id,
            name: name.clone(),
            user_id: link.map(|link| link.user_id),
            connected,
        });
    }

    Ok(Json(summaries))
}
