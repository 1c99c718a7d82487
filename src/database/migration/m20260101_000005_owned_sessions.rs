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
                    .table(OwnedSessions::Table)
                    .if_not_exists()
                    .col(pk_bigint(OwnedSessions::Id))
                    .col(uuid(OwnedSessions::SessionId))
                    .col(integer(OwnedSessions::UserId))
                    .col(integer(OwnedSessions::OrderIdx))
                    .foreign_key(
                        ForeignKey::create()
                            .from(OwnedSessions::Table, OwnedSessions::SessionId)
                            .to(MwSessions::Table, MwSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OwnedSessions::Table, OwnedSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-owned-sessions-session-user")
                    .table(OwnedSessions::Table)
                    .col(OwnedSessions::SessionId)
                    .col(OwnedSessions::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OwnedSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OwnedSessions {
    Table,
    Id,
    SessionId,
    UserId,
    OrderIdx,
}
