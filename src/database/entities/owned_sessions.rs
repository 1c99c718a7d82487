//! The ordered owner list of a session (spec.md §3) — owner 0 is the
//! creator. M:N between `mwsessions` and `users` plus an ordinal.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "owned_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true, column_type = "BigInteger")]
    pub id: i64,
    pub session_id: Uuid,
    pub user_id: i32,
    pub order_idx: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mwsessions::Entity",
        from = "Column::SessionId",
        to = "super::mwsessions::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::mwsessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
