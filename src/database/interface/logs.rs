use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, DatabaseConnection};
use uuid::Uuid;

use crate::database::{entities::logs, interface::DbResult};

pub async fn append(
    db: &DatabaseConnection,
    session_id: Option<Uuid>,
    level: String,
    message: String,
) -> DbResult<logs::Model> {
    logs::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        level: Set(level),
        message: Set(message),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}
