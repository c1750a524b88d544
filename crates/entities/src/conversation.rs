use sea_orm::entity::prelude::*;

/// The atomic dialog unit; exactly one conversation is live per session at
/// any instant, gated by `session_timeout_minutes` rollover.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversation")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub uuid: Uuid,
  pub session_id: i64,
  pub summary: Option<String>,
  pub date_created: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::session::Entity",
    from = "Column::SessionId",
    to = "super::session::Column::Id"
  )]
  Session,
  #[sea_orm(has_many = "super::conversation_message::Entity")]
  ConversationMessage,
}

impl Related<super::session::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Session.def()
  }
}

impl Related<super::conversation_message::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::ConversationMessage.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
