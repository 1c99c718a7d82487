//! A multiworld session (spec.md §3): the decoded multidata, feature
//! flags, optional join password, and optional allow-list.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mwsessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub game_id: i32,
    /// Constant-time compared join/owner password, stored in the clear per
    /// the original's `{mw_session, password}` issuance flow (spec.md §4.7
    /// SUPPLEMENT) — not a user credential, just a shared-session secret.
    pub password: Option<String>,
    pub multidata: Multidata,
    pub tournament: bool,
    pub flags: SessionFlags,
    pub allow_list: Option<AllowList>,
    pub created_at: DateTimeUtc,
}

/// The decoded placement table plus per-world identification, produced
/// once from the uploaded multidata file (spec.md §6).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Multidata {
    pub player_names: Vec<String>,
    pub rom_names: Vec<String>,
    pub placements: Vec<PlacementEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementEntry {
    pub location_id: i64,
    pub finder_player: i32,
    pub item_id: i64,
    pub recipient_player: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SessionFlags {
    pub chat: bool,
    pub pause_receiving: bool,
    pub missing_cmd: bool,
    pub duping: bool,
    pub forfeit: bool,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            chat: true,
            pause_receiving: true,
            missing_cmd: true,
            duping: false,
            forfeit: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AllowList(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id"
    )]
    Game,
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
    #[sea_orm(has_many = "super::sramstores::Entity")]
    SramStores,
    #[sea_orm(has_many = "super::owned_sessions::Entity")]
    OwnedSessions,
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::sramstores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SramStores.def()
    }
}

impl Related<super::owned_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnedSessions.def()
    }
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
