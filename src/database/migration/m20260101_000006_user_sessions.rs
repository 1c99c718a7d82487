use sea_orm_migration::{prelude::*, schema::*};

use super::{m20260101_000002_users::Users, m20260101_000004_mwsessions::MwSessions};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(pk_bigint(UserSessions::Id))
                    .col(uuid(UserSessions::SessionId))
                    .col(integer(UserSessions::PlayerId))
                    .col(integer(UserSessions::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserSessions::Table, UserSessions::SessionId)
                            .to(MwSessions::Table, MwSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // at most one user per player slot
        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-user-sessions-session-player")
                    .table(UserSessions::Table)
                    .col(UserSessions::SessionId)
                    .col(UserSessions::PlayerId)
                    .to_owned(),
            )
            .await?;

        // a user holds at most one slot per session
        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-user-sessions-session-user")
                    .table(UserSessions::Table)
                    .col(UserSessions::SessionId)
                    .col(UserSessions::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserSessions {
    Table,
    Id,
    SessionId,
    PlayerId,
    UserId,
}
