//! Session Runtime (spec.md §4.5): one cooperative task per live WebSocket
//! connection. Grounded on the teacher's explicit (non-actor) connection
//! loop shape — a single spawned task, a `tokio::select!` across the
//! inbound socket stream and the bus receiver, a plain struct carrying
//! connection-scoped state instead of per-message closures.

pub mod wire;

use std::{collections::HashMap, time::Duration};

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, error, warn};
use sea_orm::DatabaseConnection;
use tokio::time::timeout;
use uuid::Uuid;

use crate::{
    auth::{self, Credential},
    database::{
        entities::{mwsessions, users},
        interface::{events as event_store, sessions as session_store},
    },
    differ,
    events::{ChatData, ChatTag, Event, EventData, EventType},
    item_router::{self, PlacementIndex},
    state::AppState,
    utils::{
        time::{decode_frame_time, decode_last_delivered},
        types::{PlayerId, CHAT_ALL, SPECTATOR_PLAYER_ID},
    },
};

use wire::{ChatInboundData, ControlData, Empty, Inbound, Outbound, WireEvent};

const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(600);
const KICK_GRACE: Duration = Duration::from_secs(2);
const DEFAULT_COUNTDOWN: u32 = 5;
const MAX_COUNTDOWN: u32 = 60;
/// Number of updates to drop after a `player_forfeit` observation while the
/// forfeit-triggered flood of events settles (spec.md §4.5/§9 — "the
/// semantics of 3 are not derived, treat as a tunable").
const FORFEIT_SKIP_UPDATES: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Role {
    Player,
    Spectator,
}

struct ConnectionState {
    session: mwsessions::Model,
    placement: std::sync::Arc<PlacementIndex>,
    player_id: PlayerId,
    role: Role,
    user: Option<users::Model>,
    checked_locations: HashMap<i64, Option<i64>>,
    last_delivered: i64,
    skip_update: u32,
}

/// Entry point wired from the `/ws/{sessionId}` route.
pub async fn handle(socket: WebSocket, session_id: Uuid, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let session = match session_store::find_by_id(&state.db, session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            close(&mut sink, 4404, "Session not found").await;
            return;
        }
        Err(err) => {
            error!("session runtime: failed to load session {session_id}: {err}");
            close(&mut sink, 4404, "Session not found").await;
            return;
        }
    };

    if let Some(password) = &session.password {
        match read_text(&mut stream, Duration::from_secs(30)).await {
            Some(candidate) if constant_time_eq(&candidate, password) => {}
            _ => {
                let _ = event_store::append(
                    &state.db,
                    session_id,
                    SPECTATOR_PLAYER_ID,
                    SPECTATOR_PLAYER_ID,
                    None,
                    None,
                    None,
                    EventType::FailedJoin,
                    None,
                    EventData::default(),
                )
                .await;
                close(&mut sink, 4403, "Wrong password").await;
                return;
            }
        }
    }

    if send(&mut sink, Outbound::ConnectionAccepted(Empty {})).await.is_err() {
        return;
    }
    if send(&mut sink, Outbound::PlayerInfoRequest(Empty {})).await.is_err() {
        return;
    }

    let identify = match timeout(IDENTIFY_TIMEOUT, next_inbound(&mut stream)).await {
        Ok(Some(msg)) => msg,
        _ => {
            close(&mut sink, 4403, "Identification timed out").await;
            return;
        }
    };

    let (player_id, role, credential) = match identify {
        Inbound::PlayerInfo(data) => {
            let credential = pair_credential(data.user_id, data.session_token);
            if session.multidata.rom_names.iter().any(|rom| rom == &data.rom_name) {
                (data.player_id, Role::Player, credential)
            } else {
                let _ = send(&mut sink, Outbound::NonPlayerDetected(Empty {})).await;
                (SPECTATOR_PLAYER_ID, Role::Spectator, credential)
            }
        }
        Inbound::UserInfo(data) => {
            let credential = pair_credential(data.user_id, data.session_token);
            (SPECTATOR_PLAYER_ID, Role::Spectator, credential)
        }
        _ => {
            close(&mut sink, 4403, "Expected player_info or user_info").await;
            return;
        }
    };

    let user = match resolve_credential(&state.db, &state.server_key, credential).await {
        Ok(user) => user,
        Err(err) => {
            error!("session runtime: credential resolution failed: {err}");
            None
        }
    };

    if session.allow_list.is_some() {
        let allowed = match &user {
            Some(user) => auth::allowed(&state.db, &state.config, &session, user)
                .await
                .unwrap_or(false),
            None => false,
        };
        if !allowed {
            close(&mut sink, 4403, "Not permitted for this session").await;
            return;
        }
    }

    if role == Role::Player {
        if let Some(user) = &user {
            match session_store::find_link_by_player(&state.db, session_id, player_id).await {
                Ok(Some(link)) if link.user_id != user.id => {
                    close(&mut sink, 4409, "Player slot claimed by another user").await;
                    return;
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    let _ = session_store::link_user_to_player(
                        &state.db, session_id, player_id, user.id,
                    )
                    .await;
                }
                Err(err) => error!("session runtime: link lookup failed: {err}"),
            }
        }

        let last_connection = event_store::connection_events(&state.db, session_id, player_id)
            .await
            .unwrap_or_default();
        if matches!(last_connection.first(), Some(event) if event.event_type == EventType::PlayerJoin)
        {
            close(&mut sink, 4409, "Player already joined").await;
            return;
        }
    }

    let join_event_type = if role == Role::Player {
        EventType::PlayerJoin
    } else {
        EventType::UserJoinChat
    };
    match event_store::append(
        &state.db,
        session_id,
        player_id,
        player_id,
        None,
        None,
        None,
        join_event_type,
        None,
        EventData::default(),
    )
    .await
    {
        Ok(event) => state.fanout.publish(session_id, event),
        Err(err) => error!("session runtime: failed to append join event: {err}"),
    }

    let placement = match state.placements.get_or_build(&state.db, session_id).await {
        Ok(Some(index)) => index,
        _ => {
            error!("session runtime: failed to build placement index for {session_id}");
            close(&mut sink, 4404, "Session not found").await;
            return;
        }
    };

    if send(&mut sink, Outbound::Flags((&session.flags).into())).await.is_err() {
        return;
    }

    let (subscriber_id, mut bus_rx) = state.fanout.subscribe(session_id);
    let mut conn = ConnectionState {
        session,
        placement,
        player_id,
        role,
        user,
        checked_locations: preload_checked_locations(&state.db, session_id, player_id).await,
        last_delivered: 0,
        skip_update: 0,
    };

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Inbound>(&text) {
                            Ok(message) => {
                                if let Err(err) = handle_inbound(&state, &mut conn, &mut sink, message).await {
                                    warn!("session runtime: error handling inbound message: {err}");
                                }
                            }
                            Err(err) => debug!("session runtime: ignoring unparseable message: {err}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!("session runtime: socket error: {err}");
                        break;
                    }
                }
            }
            event = bus_rx.recv() => {
                match event {
                    Some(first) => {
                        let mut batch = vec![first];
                        while let Ok(next) = bus_rx.try_recv() {
                            batch.push(next);
                        }
                        if let Err(err) = flush_events(&state.db, &mut conn, &mut sink, batch).await {
                            warn!("session runtime: error flushing events: {err}");
                        }
                    }
                    None => break,
                }
            }
        }
    }

    state.fanout.unsubscribe(conn.session.id, subscriber_id);
    if conn.role == Role::Player {
        match event_store::append(
            &state.db,
            conn.session.id,
            conn.player_id,
            conn.player_id,
            None,
            None,
            None,
            EventType::PlayerLeave,
            None,
            EventData::default(),
        )
        .await
        {
            Ok(event) => state.fanout.publish(conn.session.id, event),
            Err(err) => error!("session runtime: failed to append leave event: {err}"),
        }
    }
}

async fn preload_checked_locations(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: PlayerId,
) -> HashMap<i64, Option<i64>> {
    let events = event_store::events_from_player(db, session_id, player_id)
        .await
        .unwrap_or_default();
    let mut checked = HashMap::new();
    for event in events {
        if event.event_type == EventType::NewItem {
            if let Some(location_id) = event.location_id {
                checked.insert(location_id, event.frame_time);
            }
        }
    }
    checked
}

fn pair_credential(user_id: Option<i32>, token: Option<String>) -> Option<Credential> {
    match (user_id, token) {
        (Some(user_id), Some(token)) => Some(Credential::Pair { user_id, token }),
        _ => None,
    }
}

async fn resolve_credential(
    db: &DatabaseConnection,
    server_key: &crate::utils::signing::ServerKey,
    credential: Option<Credential>,
) -> Result<Option<users::Model>, auth::TokenError> {
    match credential {
        Some(credential) => auth::resolve(db, server_key, credential).await,
        None => Ok(None),
    }
}

async fn handle_inbound(
    state: &AppState,
    conn: &mut ConnectionState,
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    message: Inbound,
) -> Result<(), axum::Error> {
    match message {
        Inbound::Ping => {
            send(sink, Outbound::Pong(Empty {})).await?;
        }
        Inbound::PauseReceiving => {
            publish_simple(state, conn, EventType::PlayerPauseReceive).await;
        }
        Inbound::ResumeReceiving => {
            publish_simple(state, conn, EventType::PlayerResumeReceive).await;
        }
        Inbound::Chat(data) => {
            handle_chat(state, conn, data).await;
        }
        Inbound::Control(data) => {
            handle_control(state, conn, data).await;
        }
        Inbound::UpdateMemory(data) => {
            handle_update_memory(state, conn, sink, data.sram).await?;
        }
        Inbound::PlayerInfo(_) | Inbound::UserInfo(_) => {
            debug!("session runtime: ignoring re-sent identification message");
        }
    }
    Ok(())
}

async fn publish_simple(state: &AppState, conn: &ConnectionState, event_type: EventType) {
    match event_store::append(
        &state.db,
        conn.session.id,
        conn.player_id,
        conn.player_id,
        None,
        None,
        None,
        event_type,
        None,
        EventData::default(),
    )
    .await
    {
        Ok(event) => state.fanout.publish(conn.session.id, event),
        Err(err) => error!("session runtime: failed to append {event_type:?} event: {err}"),
    }
}

/// Appends a private `chat` event addressed to the caller's own player slot
/// (`examples/original_source/server/server/utils.py` `system_chat`) so
/// command replies and flag-disabled notices are durable, show up in
/// `GET /session/{id}/events`, and are delivered back through the ordinary
/// Chat visibility filter (`should_forward`) rather than a side channel.
async fn append_private_chat(
    state: &AppState,
    conn: &ConnectionState,
    message: impl Into<String>,
    subtype: Option<&str>,
) {
    let event_data = EventData::Chat(ChatData {
        kind: ChatTag::Chat,
        message: message.into(),
        subtype: subtype.map(str::to_string),
    });

    match event_store::append(
        &state.db,
        conn.session.id,
        conn.player_id,
        conn.player_id,
        None,
        None,
        None,
        EventType::Chat,
        None,
        event_data,
    )
    .await
    {
        Ok(event) => state.fanout.publish(conn.session.id, event),
        Err(err) => error!("session runtime: failed to append system chat event: {err}"),
    }
}

async fn handle_chat(state: &AppState, conn: &mut ConnectionState, data: ChatInboundData) {
    let trimmed = data.message.trim();

    if let Some(rest) = trimmed.strip_prefix("/countdown") {
        spawn_countdown(state, conn, rest.trim()).await;
        return;
    }

    if trimmed == "/missing" {
        if conn.session.flags.missing_cmd {
            send_missing(state, conn).await;
        } else {
            append_private_chat(
                state,
                conn,
                "The /missing command is disabled in this session",
                None,
            )
            .await;
        }
        return;
    }

    if !conn.session.flags.chat {
        append_private_chat(state, conn, "Chat is disabled for this session.", None).await;
        return;
    }

    let to_player = data.to_player.unwrap_or(CHAT_ALL);
    let event_data = EventData::Chat(ChatData {
        kind: ChatTag::Chat,
        message: trimmed.to_string(),
        subtype: None,
    });

    match event_store::append(
        &state.db,
        conn.session.id,
        conn.player_id,
        to_player,
        None,
        None,
        None,
        EventType::Chat,
        None,
        event_data,
    )
    .await
    {
        Ok(event) => state.fanout.publish(conn.session.id, event),
        Err(err) => error!("session runtime: failed to append chat event: {err}"),
    }
}

async fn spawn_countdown(state: &AppState, conn: &ConnectionState, arg: &str) {
    let seconds: u32 = if arg.is_empty() {
        DEFAULT_COUNTDOWN
    } else {
        match arg.parse() {
            Ok(value) if value <= MAX_COUNTDOWN => value,
            _ => {
                append_private_chat(
                    state,
                    conn,
                    format!("Countdown must be between 0 and {MAX_COUNTDOWN}."),
                    None,
                )
                .await;
                return;
            }
        }
    };

    let db = state.db.clone();
    let fanout = state.fanout.clone();
    let session_id = conn.session.id;
    let from_player = conn.player_id;

    tokio::spawn(async move {
        for remaining in (0..=seconds).rev() {
            let message = if remaining == 0 {
                "GO!".to_string()
            } else {
                remaining.to_string()
            };
            let event_data = EventData::Chat(ChatData {
                kind: ChatTag::Chat,
                message,
                subtype: Some("countdown".to_string()),
            });
            match event_store::append(
                &db, session_id, from_player, CHAT_ALL, None, None, None,
                EventType::Chat, None, event_data,
            )
            .await
            {
                Ok(event) => fanout.publish(session_id, event),
                Err(err) => error!("session runtime: countdown append failed: {err}"),
            }
            if remaining > 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    });
}

async fn send_missing(state: &AppState, conn: &ConnectionState) {
    let mut locations = conn.placement.locations_for_finder(conn.player_id);
    let checked: std::collections::HashSet<i64> =
        event_store::events_from_player(&state.db, conn.session.id, conn.player_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|event| event.event_type == EventType::NewItem)
            .filter_map(|event| event.location_id)
            .collect();
    locations.retain(|location_id| !checked.contains(location_id));

    if locations.is_empty() {
        append_private_chat(state, conn, "No missing locations.", Some("missing")).await;
        return;
    }

    for location_id in locations {
        append_private_chat(
            state,
            conn,
            format!("Missing: location {location_id}"),
            Some("missing"),
        )
        .await;
    }
}

async fn handle_control(state: &AppState, conn: &mut ConnectionState, data: ControlData) {
    let ControlData::Kick { player_id: victim } = data;

    let is_owner = match &conn.user {
        Some(user) => session_store::is_owner(&state.db, conn.session.id, user.id)
            .await
            .unwrap_or(false),
        None => false,
    };
    let is_superuser = conn.user.as_ref().is_some_and(|user| user.is_superuser);

    if !is_owner && !is_superuser {
        return;
    }

    match event_store::append(
        &state.db,
        conn.session.id,
        conn.player_id,
        victim,
        None,
        None,
        None,
        EventType::PlayerKicked,
        None,
        EventData::default(),
    )
    .await
    {
        Ok(event) => state.fanout.publish(conn.session.id, event),
        Err(err) => {
            error!("session runtime: failed to append kick event: {err}");
            return;
        }
    }

    let db = state.db.clone();
    let fanout = state.fanout.clone();
    let session_id = conn.session.id;
    tokio::spawn(async move {
        tokio::time::sleep(KICK_GRACE).await;
        let last = event_store::connection_events(&db, session_id, victim)
            .await
            .unwrap_or_default();
        if matches!(last.first(), Some(event) if event.event_type == EventType::PlayerJoin) {
            match event_store::append(
                &db, session_id, victim, victim, None, None, None,
                EventType::PlayerLeave, None, EventData::default(),
            )
            .await
            {
                Ok(event) => fanout.publish(session_id, event),
                Err(err) => error!("session runtime: synthetic player_leave failed: {err}"),
            }
        }
    });
}

async fn handle_update_memory(
    state: &AppState,
    conn: &mut ConnectionState,
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    cur: differ::SramSnapshot,
) -> Result<(), axum::Error> {
    if conn.skip_update > 0 {
        conn.skip_update -= 1;
        return Ok(());
    }

    let previous = match crate::database::interface::sram::write_and_rotate(
        &state.db,
        conn.session.id,
        conn.player_id,
        cur.clone(),
    )
    .await
    {
        Ok(Some(previous)) => previous,
        Ok(None) => return Ok(()),
        Err(err) => {
            error!("session runtime: failed to persist sram snapshot: {err}");
            return Ok(());
        }
    };

    let total_time = cur.regions.get("total_time").map(Vec::as_slice).unwrap_or(&[]);
    let old_total_time = previous.regions.get("total_time").map(Vec::as_slice).unwrap_or(&[]);
    let frame_time = decode_frame_time(total_time);
    let old_frame_time = decode_frame_time(old_total_time);

    if let (Some(frame_time), Some(old_frame_time)) = (frame_time, old_frame_time) {
        if frame_time < old_frame_time {
            let stale = event_store::events_after_frame_time(
                &state.db, conn.session.id, conn.player_id, frame_time,
            )
            .await
            .unwrap_or_default();
            let stale_ids: Vec<i64> = stale.iter().map(|event| event.id).collect();
            if let Err(err) =
                event_store::update_events_frame_time(&state.db, &stale_ids, None).await
            {
                error!("session runtime: save-scum invalidation failed: {err}");
            }
            for event in &stale {
                if let Some(location_id) = event.location_id {
                    conn.checked_locations.remove(&location_id);
                }
            }
        }
    }

    let region_diff = differ::diff(&previous, &cur);
    if !region_diff.is_empty() {
        let locations = differ::changed_locations(&region_diff, &previous, &cur, &state.static_data);

        for name in locations {
            let Some(location_id) = state.static_data.location_id(&name) else {
                debug!("session runtime: no location id for checked location {name}");
                continue;
            };
            if conn.placement.lookup(location_id, conn.player_id).is_none() {
                continue;
            }

            let newly_checked = match conn.checked_locations.get(&location_id) {
                None => true,
                Some(cached_frame_time) => {
                    conn.session.flags.duping
                        && cached_frame_time.is_some()
                        && frame_time.is_some()
                        && cached_frame_time.unwrap() < frame_time.unwrap()
                }
            };
            if !newly_checked {
                continue;
            }

            match item_router::route_check(
                &state.db,
                &conn.placement,
                conn.session.id,
                conn.player_id,
                location_id,
                frame_time.unwrap_or_default(),
            )
            .await
            {
                Ok(Some(event)) => {
                    conn.checked_locations.insert(location_id, frame_time);
                    state.fanout.publish(conn.session.id, event);
                }
                Ok(None) => {}
                Err(err) => error!("session runtime: item router failed for {name}: {err}"),
            }
        }
    }

    let last_delivered = decode_last_delivered(cur.regions.get("multiinfo").map(Vec::as_slice).unwrap_or(&[]));
    if last_delivered > conn.last_delivered {
        conn.last_delivered = last_delivered;
    }
    match event_store::items_for_player_from_others(
        &state.db, conn.session.id, conn.player_id, conn.last_delivered,
    )
    .await
    {
        Ok(events) if !events.is_empty() => {
            let mut max_idx = conn.last_delivered;
            for event in &events {
                if let Some(idx) = event.to_player_idx {
                    max_idx = max_idx.max(idx);
                }
            }
            let wire_events: Vec<WireEvent> = events.iter().map(WireEvent::from).collect();
            send(sink, Outbound::NewItems(wire_events)).await?;
            conn.last_delivered = max_idx;
        }
        Ok(_) => {}
        Err(err) => error!("session runtime: catch-up query failed: {err}"),
    }

    Ok(())
}

async fn flush_events(
    db: &DatabaseConnection,
    conn: &mut ConnectionState,
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    batch: Vec<Event>,
) -> Result<(), axum::Error> {
    let mut items: Vec<Event> = Vec::new();
    let mut others: Vec<Event> = Vec::new();

    for event in batch {
        if !should_forward(&event, conn) {
            continue;
        }
        if event.event_type == EventType::NewItem {
            items.push(event);
        } else {
            others.push(event);
        }
    }

    for event in others {
        if event.event_type == EventType::PlayerForfeit && event.to_player == conn.player_id {
            conn.skip_update = conn.skip_update.max(FORFEIT_SKIP_UPDATES);
        }
        send(sink, to_outbound(&event)).await?;
    }

    if items.is_empty() {
        return Ok(());
    }

    items.sort_by_key(|event| event.id);
    let mut expected = conn.last_delivered + 1;
    let mut contiguous = true;
    for event in &items {
        let Some(idx) = event.to_player_idx else { continue };
        if idx != expected {
            contiguous = false;
            break;
        }
        expected += 1;
    }

    let final_items = if contiguous {
        items
    } else {
        warn!(
            "session runtime: gap detected in toPlayerIdx delivery for player {} in {}, re-fetching catch-up",
            conn.player_id, conn.session.id
        );
        event_store::items_for_player_from_others(db, conn.session.id, conn.player_id, conn.last_delivered)
            .await
            .unwrap_or_default()
    };

    let mut seen = std::collections::HashSet::new();
    let mut deduped = Vec::with_capacity(final_items.len());
    for event in final_items {
        if seen.insert(event.id) {
            deduped.push(event);
        }
    }

    if let Some(max_idx) = deduped.iter().filter_map(|event| event.to_player_idx).max() {
        conn.last_delivered = conn.last_delivered.max(max_idx);
    }

    let wire_events: Vec<WireEvent> = deduped.iter().map(WireEvent::from).collect();
    send(sink, Outbound::NewItems(wire_events)).await?;

    Ok(())
}

fn should_forward(event: &Event, conn: &ConnectionState) -> bool {
    match event.event_type {
        EventType::Chat => event.to_player == CHAT_ALL || event.to_player == conn.player_id,
        EventType::NewItem => event.to_player == conn.player_id && event.from_player != event.to_player,
        _ => true,
    }
}

fn to_outbound(event: &Event) -> Outbound {
    let wire = WireEvent::from(event);
    match event.event_type {
        EventType::Chat => Outbound::Chat(wire),
        EventType::PlayerJoin => Outbound::PlayerJoin(wire),
        EventType::PlayerLeave => Outbound::PlayerLeave(wire),
        EventType::PlayerForfeit => Outbound::PlayerForfeit(wire),
        EventType::PlayerPauseReceive => Outbound::PlayerPauseReceive(wire),
        EventType::PlayerResumeReceive => Outbound::PlayerResumeReceive(wire),
        EventType::PlayerKicked => Outbound::PlayerKicked(wire),
        EventType::SessionCreate => Outbound::SessionCreate(wire),
        EventType::FailedJoin => Outbound::FailedJoin(wire),
        EventType::UserJoinChat => Outbound::UserJoinChat(wire),
        EventType::Command => Outbound::Chat(wire),
        EventType::NewItem => Outbound::NewItem(Box::new(wire)),
    }
}

async fn send(
    sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    message: Outbound,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(&message).expect("outbound wire messages always serialize");
    sink.send(Message::Text(text)).await
}

async fn close(sink: &mut (impl Sink<Message, Error = axum::Error> + Unpin), code: u16, reason: &'static str) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

async fn next_inbound(stream: &mut (impl Stream<Item = Result<Message, axum::Error>> + Unpin)) -> Option<Inbound> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<Inbound>(&text) {
                Ok(message) => return Some(message),
                Err(err) => {
                    debug!("session runtime: ignoring unparseable identify message: {err}");
                    continue;
                }
            },
            Some(Ok(_)) => continue,
            _ => return None,
        }
    }
}

async fn read_text(stream: &mut (impl Stream<Item = Result<Message, axum::Error>> + Unpin), deadline: Duration) -> Option<String> {
    match timeout(deadline, stream.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => Some(text),
        _ => None,
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::entities::mwsessions::{Multidata, SessionFlags};

    #[test]
    fn constant_time_eq_matches_equal_strings() {
        assert!(constant_time_eq("secret", "secret"));
        assert!(!constant_time_eq("secret", "wrong!"));
        assert!(!constant_time_eq("short", "longer"));
    }

    fn test_connection(player_id: PlayerId) -> ConnectionState {
        ConnectionState {
            session: mwsessions::Model {
                id: Uuid::new_v4(),
                game_id: 1,
                password: None,
                multidata: Multidata::default(),
                tournament: false,
                flags: SessionFlags::default(),
                allow_list: None,
                created_at: chrono::Utc::now(),
            },
            placement: std::sync::Arc::new(PlacementIndex::build(&Multidata::default())),
            player_id,
            role: Role::Player,
            user: None,
            checked_locations: HashMap::new(),
            last_delivered: 0,
            skip_update: 0,
        }
    }

    fn test_event(event_type: EventType, from_player: i32, to_player: i32) -> Event {
        Event {
            id: 1,
            session_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            from_player,
            to_player,
            to_player_idx: None,
            item_id: None,
            location_id: None,
            event_type,
            frame_time: None,
            event_data: EventData::default(),
        }
    }

    /// I7 — a targeted chat event forwards only to its recipient (plus
    /// its originator, handled separately by `from_player == to_player`
    /// never excluding self); broadcast chat (`CHAT_ALL`) forwards to
    /// everyone.
    #[test]
    fn chat_visibility_is_scoped_to_recipient() {
        let whispered = test_event(EventType::Chat, 1, 2);
        assert!(should_forward(&whispered, &test_connection(2)));
        assert!(!should_forward(&whispered, &test_connection(3)));

        let broadcast = test_event(EventType::Chat, 1, CHAT_ALL);
        assert!(should_forward(&broadcast, &test_connection(2)));
        assert!(should_forward(&broadcast, &test_connection(3)));
    }

    /// Complements I2: a `new_item` event the recipient found themselves
    /// never gets forwarded back to them — their client already applied
    /// the check locally.
    #[test]
    fn new_item_self_find_is_not_forwarded_to_self() {
        let self_found = test_event(EventType::NewItem, 2, 2);
        assert!(!should_forward(&self_found, &test_connection(2)));

        let cross_player = test_event(EventType::NewItem, 1, 2);
        assert!(should_forward(&cross_player, &test_connection(2)));
        assert!(!should_forward(&cross_player, &test_connection(3)));
    }

    #[test]
    fn to_outbound_maps_event_type_to_matching_variant() {
        assert!(matches!(
            to_outbound(&test_event(EventType::Chat, 1, CHAT_ALL)),
            Outbound::Chat(_)
        ));
        assert!(matches!(
            to_outbound(&test_event(EventType::PlayerKicked, 1, 2)),
            Outbound::PlayerKicked(_)
        ));
        assert!(matches!(
            to_outbound(&test_event(EventType::NewItem, 1, 2)),
            Outbound::NewItem(_)
        ));
    }
}
