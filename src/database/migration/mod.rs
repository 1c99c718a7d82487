pub use sea_orm_migration::prelude::*;

mod m20260101_000001_games;
mod m20260101_000002_users;
mod m20260101_000003_api_keys;
mod m20260101_000004_mwsessions;
mod m20260101_000005_owned_sessions;
mod m20260101_000006_user_sessions;
mod m20260101_000007_events;
mod m20260101_000008_sramstores;
mod m20260101_000009_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_games::Migration),
            Box::new(m20260101_000002_users::Migration),
            Box::new(m20260101_000003_api_keys::Migration),
            Box::new(m20260101_000004_mwsessions::Migration),
            Box::new(m20260101_000005_owned_sessions::Migration),
            Box::new(m20260101_000006_user_sessions::Migration),
            Box::new(m20260101_000007_events::Migration),
            Box::new(m20260101_000008_sramstores::Migration),
            Box::new(m20260101_000009_logs::Migration),
        ]
    }
}
