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
                    .table(SramStores::Table)
                    .if_not_exists()
                    .col(pk_bigint(SramStores::Id))
                    .col(uuid(SramStores::SessionId))
                    .col(integer(SramStores::PlayerId))
                    .col(json_binary(SramStores::Current))
                    .col(json_binary(SramStores::Previous))
                    .col(date_time(SramStores::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .from(SramStores::Table, SramStores::SessionId)
                            .to(MwSessions::Table, MwSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-sramstores-session-player")
                    .table(SramStores::Table)
                    .col(SramStores::SessionId)
                    .col(SramStores::PlayerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SramStores::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SramStores {
    Table,
    Id,
    SessionId,
    PlayerId,
    Current,
    Previous,
    UpdatedAt,
}
