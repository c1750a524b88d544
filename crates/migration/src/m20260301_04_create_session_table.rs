use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_02_create_entity_table::Entity as EntityTable;
use crate::m20260301_03_create_process_table::Process as ProcessTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Session::Table)
          .if_not_exists()
          .col(pk_auto(Session::Id))
          .col(uuid(Session::Uuid))
          .col(big_integer_null(Session::EntityId))
          .col(big_integer_null(Session::ProcessId))
          .col(timestamp_with_time_zone(Session::DateCreated).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(Session::Uuid))
          .foreign_key(
            ForeignKey::create()
              .from(Session::Table, Session::EntityId)
              .to(EntityTable::Table, EntityTable::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .from(Session::Table, Session::ProcessId)
              .to(ProcessTable::Table, ProcessTable::Id),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Session::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Session {
  Table,
  Id,
  Uuid,
  EntityId,
  ProcessId,
  DateCreated,
}
