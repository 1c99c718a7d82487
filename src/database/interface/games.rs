use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter,
};

use crate::database::{entities::games, interface::DbResult};

pub async fn find_or_create(db: &DatabaseConnection, name: &str) -> DbResult<games::Model> {
    if let Some(existing) = games::Entity::find()
        .filter(games::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    games::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    }
    .insert(db)
    .await
}
