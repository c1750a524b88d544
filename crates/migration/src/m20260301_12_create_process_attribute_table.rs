use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_03_create_process_table::Process as ProcessTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ProcessAttribute::Table)
          .if_not_exists()
          .col(pk_auto(ProcessAttribute::Id))
          .col(uuid(ProcessAttribute::Uuid))
          .col(big_integer(ProcessAttribute::ProcessId))
          .col(text(ProcessAttribute::Content))
          .col(big_integer(ProcessAttribute::NumTimes).default(1))
          .col(timestamp_with_time_zone(ProcessAttribute::DateLastTime).default(Expr::current_timestamp()))
          .col(string(ProcessAttribute::Uniq))
          .index(Index::create().unique().col(ProcessAttribute::Uuid))
          .index(
            Index::create()
              .unique()
              .col(ProcessAttribute::ProcessId)
              .col(ProcessAttribute::Uniq),
          )
          .foreign_key(
            ForeignKey::create()
              .from(ProcessAttribute::Table, ProcessAttribute::ProcessId)
              .to(ProcessTable::Table, ProcessTable::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ProcessAttribute::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum ProcessAttribute {
  Table,
  Id,
  Uuid,
  ProcessId,
  Content,
  NumTimes,
  DateLastTime,
  Uniq,
}
