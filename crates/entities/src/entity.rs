use sea_orm::entity::prelude::*;

/// The principal whose memories are stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entity")]
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
  #[sea_orm(has_many = "super::entity_fact::Entity")]
  EntityFact,
  #[sea_orm(has_many = "super::knowledge_graph::Entity")]
  KnowledgeGraph,
}

impl Related<super::session::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Session.def()
  }
}

impl Related<super::entity_fact::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::EntityFact.def()
  }
}

impl Related<super::knowledge_graph::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::KnowledgeGraph.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
