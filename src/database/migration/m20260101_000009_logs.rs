use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Logs::Table)
                    .if_not_exists()
                    .col(pk_bigint(Logs::Id))
                    .col(uuid_null(Logs::SessionId))
                    .col(string(Logs::Level))
                    .col(text(Logs::Message))
                    .col(date_time(Logs::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Logs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Logs {
    Table,
    Id,
    SessionId,
    Level,
    CreatedAt,
    Message,
}
