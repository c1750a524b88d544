use sea_orm::entity::prelude::*;

/// A durable fact about an entity plus its embedding. `(entity_id, uniq)`
/// is unique; re-insertion increments `num_times` and bumps
/// `date_last_time` instead of creating a new row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_fact")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub entity_id: i64,
  #[sea_orm(column_type = "Text")]
  pub content: String,
  /// Little-endian packed float32 vector, `4 * D` bytes.
  pub content_embedding: Vec<u8>,
  pub num_times: i64,
  pub date_last_time: DateTimeUtc,
  pub uniq: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::entity::Entity",
    from = "Column::EntityId",
    to = "super::entity::Column::Id"
  )]
  Entity,
}

impl Related<super::entity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Entity.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
