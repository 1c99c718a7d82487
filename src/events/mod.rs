//! Event domain model (spec.md §3, §6): the `EventType` enum and the
//! tagged `EventData` payload, per Design Note §9 — a variant per known
//! event kind with an `Other(Value)` escape hatch so forward-compatible
//! fields round-trip without a schema change.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::types::{EventId, ItemId, LocationId, PlayerId, SessionId};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[sea_orm(string_value = "session_create")]
    SessionCreate,
    #[sea_orm(string_value = "player_join")]
    PlayerJoin,
    #[sea_orm(string_value = "failed_join")]
    FailedJoin,
    #[sea_orm(string_value = "player_leave")]
    PlayerLeave,
    #[sea_orm(string_value = "chat")]
    Chat,
    #[sea_orm(string_value = "command")]
    Command,
    #[sea_orm(string_value = "new_item")]
    NewItem,
    #[sea_orm(string_value = "player_forfeit")]
    PlayerForfeit,
    #[sea_orm(string_value = "player_pause_receive")]
    PlayerPauseReceive,
    #[sea_orm(string_value = "player_resume_receive")]
    PlayerResumeReceive,
    #[sea_orm(string_value = "user_join_chat")]
    UserJoinChat,
    #[sea_orm(string_value = "player_kicked")]
    PlayerKicked,
}

/// Free-form `eventData`, tagged by event kind with an untyped fallback
/// for anything the known variants don't model. Serde can't mix internal
/// tagging with a data-carrying catch-all variant, so each known shape
/// carries its own literal `type` discriminant and the whole enum is
/// `untagged`: the first shape that matches wins, and anything else falls
/// through to `Other`, preserving its fields as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(untagged)]
pub enum EventData {
    Chat(ChatData),
    Command(CommandData),
    Kick(KickData),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    #[serde(rename = "type")]
    pub kind: ChatTag,
    pub message: String,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatTag {
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandData {
    #[serde(rename = "type")]
    pub kind: CommandTag,
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandTag {
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickData {
    #[serde(rename = "type")]
    pub kind: KickTag,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickTag {
    Kick,
}

impl Default for EventData {
    fn default() -> Self {
        EventData::Other(Value::Null)
    }
}

/// An event as returned from the store, independent of the sea-orm model
/// shape (used by the fan-out bus and the wire protocol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub from_player: PlayerId,
    pub to_player: PlayerId,
    pub to_player_idx: Option<i64>,
    pub item_id: Option<ItemId>,
    pub location_id: Option<LocationId>,
    pub event_type: EventType,
    pub frame_time: Option<i64>,
    pub event_data: EventData,
}

impl From<crate::database::entities::events::Model> for Event {
    fn from(model: crate::database::entities::events::Model) -> Self {
        Self {
            id: model.id,
            session_id: model.session_id,
            timestamp: model.created_at,
            from_player: model.from_player,
            to_player: model.to_player,
            to_player_idx: model.to_player_idx,
            item_id: model.item_id,
            location_id: model.location_id,
            event_type: model.event_type,
            frame_time: model.frame_time,
            event_data: model.event_data,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn other_variant_round_trips_unknown_fields() {
        let raw = r#"{"type":"some_future_kind","foo":"bar"}"#;
        let parsed: EventData = serde_json::from_str(raw).unwrap();
        assert!(matches!(parsed, EventData::Other(_)));
    }

    #[test]
    fn chat_variant_parses() {
        let raw = r#"{"type":"chat","message":"hi","subtype":null}"#;
        let parsed: EventData = serde_json::from_str(raw).unwrap();
        assert!(matches!(parsed, EventData::Chat { .. }));
    }
}
