use sea_orm::entity::prelude::*;

/// An `(entity, subject, predicate, object)` tuple; upsert increments
/// `num_times`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "knowledge_graph")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub entity_id: i64,
  pub subject_id: i64,
  pub predicate_id: i64,
  pub object_id: i64,
  pub num_times: i64,
  pub date_last_time: DateTimeUtc,
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
    belongs_to = "super::subject::Entity",
    from = "Column::SubjectId",
    to = "super::subject::Column::Id"
  )]
  Subject,
  #[sea_orm(
    belongs_to = "super::predicate::Entity",
    from = "Column::PredicateId",
    to = "super::predicate::Column::Id"
  )]
  Predicate,
  #[sea_orm(
    belongs_to = "super::object::Entity",
    from = "Column::ObjectId",
    to = "super::object::Column::Id"
  )]
  Object,
}

impl Related<super::entity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Entity.def()
  }
}

impl Related<super::subject::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Subject.def()
  }
}

impl Related<super::predicate::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Predicate.def()
  }
}

impl Related<super::object::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Object.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
