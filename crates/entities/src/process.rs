use sea_orm::entity::prelude::*;

/// The application/agent identity, orthogonal to `Entity`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "process")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  #[sea_orm(unique)]
  pub external_id: String,
  pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::session::Entity")]
  Session,
  #[sea_orm(has_many = "super::process_attribute::Entity")]
  ProcessAttribute,
}

impl Related<super::session::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Session.def()
  }
}

impl Related<super::process_attribute::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::ProcessAttribute.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
