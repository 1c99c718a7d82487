//! Module for type aliases that help to better identify field types

use uuid::Uuid;

/// Opaque 128-bit session identifier
pub type SessionId = Uuid;

/// Player slot number within a session (as assigned by the multidata)
pub type PlayerId = i32;

/// Sentinel player id used by spectator connections
pub const SPECTATOR_PLAYER_ID: PlayerId = -2;

/// Sentinel `toPlayer` used by broadcast chat messages
pub const CHAT_ALL: PlayerId = -1;

/// Sentinel `fromPlayer` for a `new_item` event sent via `POST
/// /session/{id}/adminSend` rather than a real finder's check — never
/// equal to a real recipient, so it never triggers the self-send
/// exemption (spec.md §4.4).
pub const ADMIN_PLAYER_ID: PlayerId = -3;

/// Database-assigned event id
pub type EventId = i64;

/// Location/item identifiers from the placement table
pub type LocationId = i64;
pub type ItemId = i64;

/// Database primary key for registered users
pub type UserId = i32;
