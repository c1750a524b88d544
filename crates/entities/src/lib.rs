pub mod conversation;
pub mod conversation_message;
pub mod entity;
pub mod entity_fact;
pub mod knowledge_graph;
pub mod object;
pub mod predicate;
pub mod process;
pub mod process_attribute;
pub mod schema_version;
pub mod session;
pub mod subject;

pub mod prelude {
  pub use super::conversation::Entity as Conversation;
  pub use super::conversation_message::Entity as ConversationMessage;
  pub use super::entity::Entity as EntityRow;
  pub use super::entity_fact::Entity as EntityFact;
  pub use super::knowledge_graph::Entity as KnowledgeGraph;
  pub use super::object::Entity as Object;
  pub use super::predicate::Entity as Predicate;
  pub use super::process::Entity as Process;
  pub use super::process_attribute::Entity as ProcessAttribute;
  pub use super::schema_version::Entity as SchemaVersion;
  pub use super::session::Entity as Session;
  pub use super::subject::Entity as Subject;
}
