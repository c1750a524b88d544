use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Object::Table)
          .if_not_exists()
          .col(pk_auto(Object::Id))
          .col(uuid(Object::Uuid))
          .col(string(Object::Content))
          .col(string(Object::Uniq))
          .index(Index::create().unique().col(Object::Uuid))
          .index(Index::create().unique().col(Object::Uniq))
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Object::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum Object {
  Table,
  Id,
  Uuid,
  Content,
  Uniq,
}
