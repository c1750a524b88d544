use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_04_create_session_table::Session as SessionTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Conversation::Table)
          .if_not_exists()
          .col(pk_auto(Conversation::Id))
          .col(uuid(Conversation::Uuid))
          .col(big_integer(Conversation::SessionId))
          .col(text_null(Conversation::Summary))
          .col(timestamp_with_time_zone(Conversation::DateCreated).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(Conversation::Uuid))
          .foreign_key(
            ForeignKey::create()
              .from(Conversation::Table, Conversation::SessionId)
              .to(SessionTable::Table, SessionTable::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Conversation::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Conversation {
  Table,
  Id,
  Uuid,
  SessionId,
  Summary,
  DateCreated,
}
