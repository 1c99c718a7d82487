//! Event Store operations (spec.md §4.3).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    database::{entities::events, interface::DbResult},
    events::{Event, EventData, EventType},
};

/// Atomic insert; returns `Err` (including the unique-constraint
/// violation) for the caller — the Item Router retries with
/// `toPlayerIdx + 1` (spec.md §4.4).
pub async fn append(
    db: &DatabaseConnection,
    session_id: Uuid,
    from_player: i32,
    to_player: i32,
    to_player_idx: Option<i64>,
    item_id: Option<i64>,
    location_id: Option<i64>,
    event_type: EventType,
    frame_time: Option<i64>,
    event_data: EventData,
) -> Result<Event, DbErr> {
    let model = events::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        created_at: Set(Utc::now()),
        from_player: Set(from_player),
        to_player: Set(to_player),
        to_player_idx: Set(to_player_idx),
        item_id: Set(item_id),
        location_id: Set(location_id),
        event_type: Set(event_type),
        frame_time: Set(frame_time),
        event_data: Set(event_data),
    }
    .insert(db)
    .await?;

    Ok(model.into())
}

pub async fn last_event_for_session(
    db: &DatabaseConnection,
    session_id: Uuid,
) -> DbResult<Option<Event>> {
    let model = events::Entity::find()
        .filter(events::Column::SessionId.eq(session_id))
        .order_by_desc(events::Column::CreatedAt)
        .one(db)
        .await?;
    Ok(model.map(Into::into))
}

pub async fn events_for_session(
    db: &DatabaseConnection,
    session_id: Uuid,
    skip: u64,
    limit: u64,
) -> DbResult<Vec<Event>> {
    let models = events::Entity::find()
        .filter(events::Column::SessionId.eq(session_id))
        .order_by_asc(events::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn events_from_player(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
) -> DbResult<Vec<Event>> {
    let models = events::Entity::find()
        .filter(
            events::Column::SessionId
                .eq(session_id)
                .and(events::Column::FromPlayer.eq(player_id)),
        )
        .order_by_asc(events::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

pub async fn events_after_frame_time(
    db: &DatabaseConnection,
    session_id: Uuid,
    from_player: i32,
    frame_time: i64,
) -> DbResult<Vec<Event>> {
    let models = events::Entity::find()
        .filter(
            events::Column::SessionId
                .eq(session_id)
                .and(events::Column::FromPlayer.eq(from_player))
                .and(events::Column::FrameTime.gte(frame_time)),
        )
        .order_by_asc(events::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

/// Sets `frameTime` on every given event, `None` to mark it invalidated
/// (spec.md §4.3/I5).
pub async fn update_events_frame_time(
    db: &DatabaseConnection,
    event_ids: &[i64],
    new_frame_time: Option<i64>,
) -> DbResult<()> {
    for &id in event_ids {
        if let Some(model) = events::Entity::find_by_id(id).one(db).await? {
            let mut active = model.into();
            set_frame_time(&mut active, new_frame_time);
            events::Entity::update(active).exec(db).await?;
        }
    }
    Ok(())
}

fn set_frame_time(active: &mut events::ActiveModel, frame_time: Option<i64>) {
    active.frame_time = Set(frame_time);
}

/// `new_item` events not originated by `to_player`, ordered ascending by
/// `toPlayerIdx`, strictly greater than `gt_idx` — used for catch-up
/// (spec.md §4.3/I6).
pub async fn items_for_player_from_others(
    db: &DatabaseConnection,
    session_id: Uuid,
    to_player: i32,
    gt_idx: i64,
) -> DbResult<Vec<Event>> {
    let models = events::Entity::find()
        .filter(
            events::Column::SessionId
                .eq(session_id)
                .and(events::Column::ToPlayer.eq(to_player))
                .and(events::Column::EventType.eq(EventType::NewItem))
                .and(events::Column::FromPlayer.ne(to_player))
                .and(events::Column::ToPlayerIdx.gt(gt_idx)),
        )
        .order_by_asc(events::Column::ToPlayerIdx)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

/// The last `player_join`/`player_leave` pair per player, newest first
/// (spec.md §4.3).
pub async fn connection_events(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
) -> DbResult<Vec<Event>> {
    let models = events::Entity::find()
        .filter(
            events::Column::SessionId
                .eq(session_id)
                .and(events::Column::ToPlayer.eq(player_id))
                .and(
                    events::Column::EventType
                        .eq(EventType::PlayerJoin)
                        .or(events::Column::EventType.eq(EventType::PlayerLeave)),
                ),
        )
        .order_by(events::Column::Id, Order::Desc)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Into::into).collect())
}

/// The current maximum `toPlayerIdx` issued to `to_player` in this session
/// by any finder other than `to_player` — the Item Router's allocation
/// basis (spec.md §4.4).
pub async fn max_to_player_idx(
    db: &DatabaseConnection,
    session_id: Uuid,
    to_player: i32,
) -> DbResult<Option<i64>> {
    let model = events::Entity::find()
        .filter(
            events::Column::SessionId
                .eq(session_id)
                .and(events::Column::ToPlayer.eq(to_player))
                .and(events::Column::FromPlayer.ne(to_player))
                .and(events::Column::ToPlayerIdx.is_not_null()),
        )
        .order_by_desc(events::Column::ToPlayerIdx)
        .one(db)
        .await?;
    Ok(model.and_then(|m| m.to_player_idx))
}
