use sea_orm::entity::prelude::*;

/// Single-row table recording the highest fully-applied migration,
/// stored per the project's off-by-one convention (`max(applied) - 1`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "schema_version")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
