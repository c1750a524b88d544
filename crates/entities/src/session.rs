use sea_orm::entity::prelude::*;

/// An uninterrupted interaction window; may own zero or many
/// conversations, which never span sessions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub entity_id: Option<i64>,
  pub process_id: Option<i64>,
  pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::entity::Entity",
    from = "Column::EntityId",
    to = "super::entity::Column::Id"
  )]
  Entity,
  #[sea_orm(
    belongs_to = "super::process::Entity",
    from = "Column::ProcessId",
    to = "super::process::Column::Id"
  )]
  Process,
  #[sea_orm(has_many = "super::conversation::Entity")]
  Conversation,
}

impl Related<super::entity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Entity.def()
  }
}

impl Related<super::process::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Process.def()
  }
}

impl Related<super::conversation::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Conversation.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
