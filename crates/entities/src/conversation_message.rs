use sea_orm::entity::prelude::*;

/// One utterance; ordered within its conversation by `id` (insertion
/// order). `role="system"` rows are never written here — they carry the
/// recall injection and must not be recursively learned.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversation_message")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub conversation_id: i64,
  pub role: String,
  pub r#type: Option<String>,
  #[sea_orm(column_type = "Text")]
  pub content: String,
  pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::conversation::Entity",
    from = "Column::ConversationId",
    to = "super::conversation::Column::Id"
  )]
  Conversation,
}

impl Related<super::conversation::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Conversation.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
