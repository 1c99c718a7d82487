use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::database::{
    entities::{
        mwsessions::{self, AllowList, Multidata, SessionFlags},
        owned_sessions, user_sessions,
    },
    interface::DbResult,
};

pub async fn create(
    db: &DatabaseConnection,
    game_id: i32,
    password: Option<String>,
    multidata: Multidata,
    tournament: bool,
) -> DbResult<mwsessions::Model> {
    mwsessions::ActiveModel {
        id: Set(Uuid::new_v4()),
        game_id: Set(game_id),
        password: Set(password),
        multidata: Set(multidata),
        tournament: Set(tournament),
        flags: Set(SessionFlags::default()),
        allow_list: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> DbResult<Option<mwsessions::Model>> {
    mwsessions::Entity::find_by_id(id).one(db).await
}

/// Every session id, for the idle-reaping sweep (spec.md §3 lifecycle —
/// "inactive" is a derived label, not a persisted column, so the sweep
/// has to walk the full set and check each one's last event).
pub async fn all_ids(db: &DatabaseConnection) -> DbResult<Vec<Uuid>> {
    use sea_orm::QuerySelect;

    mwsessions::Entity::find()
        .select_only()
        .column(mwsessions::Column::Id)
        .into_tuple()
        .all(db)
        .await
}

pub async fn set_allow_list(
    db: &DatabaseConnection,
    session: mwsessions::Model,
    allow_list: Option<Vec<String>>,
) -> DbResult<mwsessions::Model> {
    let mut model: mwsessions::ActiveModel = session.into();
    model.allow_list = Set(allow_list.map(AllowList));
    model.update(db).await
}

pub async fn add_owner(
    db: &DatabaseConnection,
    session_id: Uuid,
    user_id: i32,
) -> DbResult<owned_sessions::Model> {
    let next_idx = owned_sessions::Entity::find()
        .filter(owned_sessions::Column::SessionId.eq(session_id))
        .order_by_desc(owned_sessions::Column::OrderIdx)
        .one(db)
        .await?
        .map(|o| o.order_idx + 1)
        .unwrap_or(0);

    owned_sessions::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        user_id: Set(user_id),
        order_idx: Set(next_idx),
    }
    .insert(db)
    .await
}

pub async fn owners(
    db: &DatabaseConnection,
    session_id: Uuid,
) -> DbResult<Vec<owned_sessions::Model>> {
    owned_sessions::Entity::find()
        .filter(owned_sessions::Column::SessionId.eq(session_id))
        .order_by_asc(owned_sessions::Column::OrderIdx)
        .all(db)
        .await
}

pub async fn is_owner(db: &DatabaseConnection, session_id: Uuid, user_id: i32) -> DbResult<bool> {
    let count = owned_sessions::Entity::find()
        .filter(
            owned_sessions::Column::SessionId
                .eq(session_id)
                .and(owned_sessions::Column::UserId.eq(user_id)),
        )
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Looks up the user-session link for a player slot, if one exists.
pub async fn find_link_by_player(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
) -> DbResult<Option<user_sessions::Model>> {
    user_sessions::Entity::find()
        .filter(
            user_sessions::Column::SessionId
                .eq(session_id)
                .and(user_sessions::Column::PlayerId.eq(player_id)),
        )
        .one(db)
        .await
}

/// Creates the `(session, player) -> user` link, locking the slot to that
/// identity for the session's life (spec.md §4.5 AUTHZ).
pub async fn link_user_to_player(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
    user_id: i32,
) -> DbResult<user_sessions::Model> {
    user_sessions::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        player_id: Set(player_id),
        user_id: Set(user_id),
    }
    .insert(db)
    .await
}
