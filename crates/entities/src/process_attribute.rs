use sea_orm::entity::prelude::*;

/// A durable attribute about a process. Same dedup shape as `EntityFact`
/// but without an embedding.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "process_attribute")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub process_id: i64,
  #[sea_orm(column_type = "Text")]
  pub content: String,
  pub num_times: i64,
  pub date_last_time: DateTimeUtc,
  pub uniq: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::process::Entity",
    from = "Column::ProcessId",
    to = "super::process::Column::Id"
  )]
  Process,
}

impl Related<super::process::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Process.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
