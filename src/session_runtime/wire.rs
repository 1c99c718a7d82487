//! WebSocket wire schema (spec.md §6): `{type, data}` envelopes in both
//! directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    differ::SramSnapshot,
    events::{Event, EventData, EventType},
};

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Outbound {
    ConnectionAccepted(Empty),
    PlayerInfoRequest(Empty),
    NonPlayerDetected(Empty),
    InitSuccess(Empty),
    Flags(FlagsData),
    Pong(Empty),
    NewItem(Box<WireEvent>),
    NewItems(Vec<WireEvent>),
    Chat(WireEvent),
    PlayerJoin(WireEvent),
    PlayerLeave(WireEvent),
    PlayerForfeit(WireEvent),
    PlayerPauseReceive(WireEvent),
    PlayerResumeReceive(WireEvent),
    PlayerKicked(WireEvent),
    SessionCreate(WireEvent),
    FailedJoin(WireEvent),
    UserJoinChat(WireEvent),
}

#[derive(Debug, Serialize)]
pub struct FlagsData {
    pub chat: bool,
    pub pause_receiving: bool,
    pub missing_cmd: bool,
    pub duping: bool,
    pub forfeit: bool,
}

impl From<&crate::database::entities::mwsessions::SessionFlags> for FlagsData {
    fn from(flags: &crate::database::entities::mwsessions::SessionFlags) -> Self {
        Self {
            chat: flags.chat,
            pause_receiving: flags.pause_receiving,
            missing_cmd: flags.missing_cmd,
            duping: flags.duping,
            forfeit: flags.forfeit,
        }
    }
}

/// One event as it appears in `new_item`/`new_items`/broadcast frames.
#[derive(Debug, Clone, Serialize)]
pub struct WireEvent {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub from_player: i32,
    pub to_player: i32,
    pub item_id: Option<i64>,
    pub location: Option<i64>,
    pub event_data: EventData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_idx: Option<[u8; 2]>,
}

impl From<&Event> for WireEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            timestamp: event.timestamp,
            event_type: event.event_type,
            from_player: event.from_player,
            to_player: event.to_player,
            item_id: event.item_id,
            location: event.location_id,
            event_data: event.event_data.clone(),
            event_idx: event
                .to_player_idx
                .map(crate::utils::time::encode_event_idx),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Inbound {
    PlayerInfo(PlayerInfoData),
    UserInfo(UserInfoData),
    Ping,
    PauseReceiving,
    ResumeReceiving,
    Chat(ChatInboundData),
    Control(ControlData),
    UpdateMemory(UpdateMemoryData),
}

#[derive(Debug, Deserialize)]
pub struct PlayerInfoData {
    pub player_id: i32,
    pub rom_name: String,
    pub user_id: Option<i32>,
    pub session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoData {
    pub user_id: Option<i32>,
    pub session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatInboundData {
    pub message: String,
    #[serde(default)]
    pub to_player: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlData {
    Kick { player_id: i32 },
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemoryData {
    pub sram: SramSnapshot,
}
