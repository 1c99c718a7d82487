//! Durable append log (spec.md §4.3). The `(session_id, to_player,
//! to_player_idx)` unique index is created in the owning migration; SQLite
//! treats NULLs as distinct, so unindexed (self-send) rows never collide.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::events::{EventData, EventType};

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true, column_type = "BigInteger")]
    pub id: i64,
    pub session_id: Uuid,
    pub created_at: DateTimeUtc,
    pub from_player: i32,
    pub to_player: i32,
    pub to_player_idx: Option<i64>,
    pub item_id: Option<i64>,
    pub location_id: Option<i64>,
    pub event_type: EventType,
    pub frame_time: Option<i64>,
    pub event_data: EventData,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mwsessions::Entity",
        from = "Column::SessionId",
        to = "super::mwsessions::Column::Id"
    )]
    Session,
}

impl Related<super::mwsessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
