//! Per-`(session, player)` SRAM snapshot storage (spec.md §3, §4.5).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter,
};
use uuid::Uuid;

use crate::{
    database::{
        entities::sramstores::{self, StoredSnapshot},
        interface::DbResult,
    },
    differ::SramSnapshot,
};

/// Writes `cur` as the new snapshot, moving the existing `current` into
/// `previous`. Returns `None` for the previous snapshot on the
/// first-ever write for this `(session, player)` — the caller drops that
/// update per spec.md §4.5 step 2.
pub async fn write_and_rotate(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
    cur: SramSnapshot,
) -> DbResult<Option<SramSnapshot>> {
    match find(db, session_id, player_id).await? {
        Some(existing) => {
            let old_current = existing.current.0.clone();
            let mut model = existing.into_active_model();
            model.previous = Set(StoredSnapshot(old_current.clone()));
            model.current = Set(StoredSnapshot(cur));
            model.updated_at = Set(Utc::now());
            model.update(db).await?;
            Ok(Some(old_current))
        }
        None => {
            sramstores::ActiveModel {
                id: NotSet,
                session_id: Set(session_id),
                player_id: Set(player_id),
                current: Set(StoredSnapshot(cur)),
                previous: Set(StoredSnapshot(SramSnapshot::default())),
                updated_at: Set(Utc::now()),
            }
            .insert(db)
            .await?;
            Ok(None)
        }
    }
}

pub async fn find(
    db: &DatabaseConnection,
    session_id: Uuid,
    player_id: i32,
) -> DbResult<Option<sramstores::Model>> {
    sramstores::Entity::find()
        .filter(
            sramstores::Column::SessionId
                .eq(session_id)
                .and(sramstores::Column::PlayerId.eq(player_id)),
        )
        .one(db)
        .await
}
