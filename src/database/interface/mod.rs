pub mod api_keys;
pub mod events;
pub mod games;
pub mod logs;
pub mod sessions;
pub mod sram;
pub mod users;

pub use super::DbResult;
