//! Registered user identities (spec.md §4.7). A user authenticates either
//! with a bearer API key (see `api_keys`) or a `(userId, sessionToken)`
//! cookie pair; the latter are stored encrypted under the server key and
//! decrypted/compared at resolve time, never persisted in plaintext.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i32,
    /// OAuth/external identity id, checked against a session's allow-list.
    #[sea_orm(unique)]
    pub external_identity_id: Option<String>,
    pub display_name: String,
    pub is_superuser: bool,
    /// Encrypted session tokens currently issued to this user.
    pub session_tokens: StoredSessionTokens,
    pub created_at: DateTimeUtc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StoredSessionTokens(pub Vec<StoredSessionToken>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSessionToken {
    /// Server-key-encrypted token bytes, base64-encoded for JSON storage.
    pub ciphertext: String,
    pub issued_at: DateTimeUtc,
}

impl StoredSessionToken {
    pub fn is_expired(&self, expire_days: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.issued_at);
        age.num_days() >= (expire_days as i64) + 1
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::api_keys::Entity")]
    ApiKeys,
    #[sea_orm(has_many = "super::owned_sessions::Entity")]
    OwnedSessions,
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
}

impl Related<super::api_keys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApiKeys.def()
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
