use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_05_create_conversation_table::Conversation as ConversationTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ConversationMessage::Table)
          .if_not_exists()
          .col(pk_auto(ConversationMessage::Id))
          .col(uuid(ConversationMessage::Uuid))
          .col(big_integer(ConversationMessage::ConversationId))
          .col(string(ConversationMessage::Role))
          .col(string_null(ConversationMessage::Type))
          .col(text(ConversationMessage::Content))
          .col(timestamp_with_time_zone(ConversationMessage::DateCreated).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(ConversationMessage::Uuid))
          .foreign_key(
            ForeignKey::create()
              .from(ConversationMessage::Table, ConversationMessage::ConversationId)
              .to(ConversationTable::Table, ConversationTable::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_conversation_message_conversation_id")
          .table(ConversationMessage::Table)
          .col(ConversationMessage::ConversationId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ConversationMessage::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum ConversationMessage {
  Table,
  Id,
  Uuid,
  ConversationId,
  Role,
  Type,
  Content,
  DateCreated,
}
