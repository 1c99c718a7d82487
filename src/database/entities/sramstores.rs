//! Per-`(session, player)` SRAM snapshot pair (spec.md §3). Overwritten on
//! every `update_memory`; never queried by clients, only by the differ.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::differ::SramSnapshot;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sramstores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true, column_type = "BigInteger")]
    pub id: i64,
    #[sea_orm(indexed)]
    pub session_id: Uuid,
    pub player_id: i32,
    pub current: StoredSnapshot,
    pub previous: StoredSnapshot,
    pub updated_at: DateTimeUtc,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StoredSnapshot(pub SramSnapshot);

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
