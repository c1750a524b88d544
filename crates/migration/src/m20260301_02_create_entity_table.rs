use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Entity::Table)
          .if_not_exists()
          .col(pk_auto(Entity::Id))
          .col(uuid(Entity::Uuid))
          .col(string(Entity::ExternalId))
          .col(timestamp_with_time_zone(Entity::DateCreated).default(Expr::current_timestamp()))
          .index(Index::create().unique().col(Entity::Uuid))
          .index(Index::create().unique().col(Entity::ExternalId))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Entity::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Entity {
  Table,
  Id,
  Uuid,
  ExternalId,
  DateCreated,
}
