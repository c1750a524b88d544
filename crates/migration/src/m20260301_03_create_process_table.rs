use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Process::Table)
          .if_not_exists()
          .col(pk_auto(Process::Id))
          .col(uuid(Process::Uuid))
          .col(string(Process::ExternalId))
          .col(timestamp_with_time_zone(Process::DateCreated).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(Process::Uuid))
          .index(Index::create().unique().col(Process::ExternalId))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Process::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Process {
  Table,
  Id,
  Uuid,
  ExternalId,
  DateCreated,
}
