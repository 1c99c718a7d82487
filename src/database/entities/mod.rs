pub mod api_keys;
pub mod events;
pub mod games;
pub mod logs;
pub mod mwsessions;
pub mod owned_sessions;
pub mod sramstores;
pub mod user_sessions;
pub mod users;

pub type Game = games::Model;
pub type User = users::Model;
pub type ApiKey = api_keys::Model;
pub type MwSession = mwsessions::Model;
pub type OwnedSession = owned_sessions::Model;
pub type UserSession = user_sessions::Model;
pub type Event = events::Model;
pub type SramStore = sramstores::Model;
pub type Log = logs::Model;
