use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Subject::Table)
          .if_not_exists()
          .col(pk_auto(Subject::Id))
          .col(uuid(Subject::Uuid))
          .col(string(Subject::Content))
          .col(string(Subject::Uniq))
          .index(Index::create().unique().col(Subject::Uuid))
          .index(Index::create().unique().col(Subject::Uniq))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Subject::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Subject {
  Table,
  Id,
  Uuid,
  Content,
  Uniq,
}
