use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Predicate::Table)
          .if_not_exists()
          .col(pk_auto(Predicate::Id))
          .col(uuid(Predicate::Uuid))
          .col(string(Predicate::Content))
          .col(string(Predicate::Uniq))
          .index(Index::create().unique().col(Predicate::Uuid))
          .index(Index::create().unique().col(Predicate::Uniq))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Predicate::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Predicate {
  Table,
  Id,
  Uuid,
  Content,
  Uniq,
}
