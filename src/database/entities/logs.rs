//! Free-form log lines posted by clients via `POST /session/{id}/log`
//! (spec.md §6). Not load-bearing for the engine; kept for diagnostics.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true, column_type = "BigInteger")]
    pub id: i64,
    pub session_id: Option<Uuid>,
    pub level: String,
    pub message: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
