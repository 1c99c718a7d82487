use sea_orm_migration::{prelude::*, schema::*};

use super::m20260101_000001_games::Games;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MwSessions::Table)
                    .if_not_exists()
                    .col(uuid(MwSessions::Id).primary_key())
                    .col(integer(MwSessions::GameId))
                    .col(string_null(MwSessions::Password))
                    .col(json_binary(MwSessions::Multidata))
                    .col(boolean(MwSessions::Tournament))
                    .col(json_binary(MwSessions::Flags))
                    .col(json_binary_null(MwSessions::AllowList))
                    .col(date_time(MwSessions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(MwSessions::Table, MwSessions::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MwSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MwSessions {
    Table,
    Id,
    GameId,
    Password,
    Multidata,
    Tournament,
    Flags,
    AllowList,
    CreatedAt,
}
