use sea_orm::entity::prelude::*;

/// Knowledge-graph vocabulary term. `uniq` is unique per table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subject")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub content: String,
  #[sea_orm(unique)]
  pub uniq: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::knowledge_graph::Entity")]
  KnowledgeGraph,
}

impl Related<super::knowledge_graph::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::KnowledgeGraph.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
