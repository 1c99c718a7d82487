use sea_orm_migration::{prelude::*, schema::*};

use super::m20260101_000004_mwsessions::MwSessions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_bigint(Events::Id))
                    .col(uuid(Events::SessionId))
                    .col(date_time(Events::CreatedAt))
                    .col(integer(Events::FromPlayer))
                    .col(integer(Events::ToPlayer))
                    .col(big_integer_null(Events::ToPlayerIdx))
                    .col(big_integer_null(Events::ItemId))
                    .col(big_integer_null(Events::LocationId))
                    .col(string(Events::EventType))
                    .col(big_integer_null(Events::FrameTime))
                    .col(json_binary(Events::EventData))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Events::Table, Events::SessionId)
                            .to(MwSessions::Table, MwSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // I1: (session, toPlayer, toPlayerIdx) uniqueness. SQLite treats
        // NULL as distinct from every other NULL, so self-sends (idx=null)
        // never collide.
        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-events-session-to-player-idx")
                    .table(Events::Table)
                    .col(Events::SessionId)
                    .col(Events::ToPlayer)
                    .col(Events::ToPlayerIdx)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-events-session-from-player")
                    .table(Events::Table)
                    .col(Events::SessionId)
                    .col(Events::FromPlayer)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    SessionId,
    CreatedAt,
    FromPlayer,
    ToPlayer,
    ToPlayerIdx,
    ItemId,
    LocationId,
    EventType,
    FrameTime,
    EventData,
}
