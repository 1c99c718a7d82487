use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter,
};

use crate::database::{entities::api_keys, interface::DbResult};

pub async fn find_by_key_hash(
    db: &DatabaseConnection,
    key_hash: &str,
) -> DbResult<Option<api_keys::Model>> {
    api_keys::Entity::find()
        .filter(api_keys::Column::KeyHash.eq(key_hash))
        .one(db)
        .await
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    key_hash: String,
) -> DbResult<api_keys::Model> {
    api_keys::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        key_hash: Set(key_hash),
        created_at: Set(Utc::now()),
        last_used: NotSet,
    }
    .insert(db)
    .await
}

pub async fn touch_last_used(
    db: &DatabaseConnection,
    key: api_keys::Model,
) -> DbResult<api_keys::Model> {
    let mut model = key.into_active_model();
    model.last_used = Set(Some(Utc::now()));
    model.update(db).await
}
