use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SchemaVersion::Table)
          .if_not_exists()
          .col(pk_auto(SchemaVersion::Id))
          .col(big_integer(SchemaVersion::Version).not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(SchemaVersion::Table).to_owned())
      .await
  }
}

#[derive(Iden)]
pub enum SchemaVersion {
  Table,
  Id,
  Version,
}
