use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_02_create_entity_table::Entity as EntityTable;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(EntityFact::Table)
          .if_not_exists()
          .col(pk_auto(EntityFact::Id))
          .col(uuid(EntityFact::Uuid))
          .col(big_integer(EntityFact::EntityId))
          .col(text(EntityFact::Content))
          .col(binary(EntityFact::ContentEmbedding))
          .col(big_integer(EntityFact::NumTimes).default(1))
          .col(timestamp_with_time_zone(EntityFact::DateLastTime).default(Expr::current_timestamp()))
          .col(string(EntityFact::Uniq))
          .index(Index::create().unique().col(EntityFact::Uuid))
          .index(
            Index::create()
              .unique()
              .col(EntityFact::EntityId)
              .col(EntityFact::Uniq),
          )
          .foreign_key(
            ForeignKey::create()
              .from(EntityFact::Table, EntityFact::EntityId)
              .to(EntityTable::Table, EntityTable::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(EntityFact::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum EntityFact {
  Table,
  Id,
  Uuid,
  EntityId,
  Content,
  ContentEmbedding,
  NumTimes,
  DateLastTime,
  Uniq,
}
