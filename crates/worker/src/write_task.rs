use chrono::{DateTime, Utc};

/// A staged write, modeled as a sum type rather than a `{method_path,
/// args, kwargs}` triple decoded at runtime (see DESIGN.md Redesign
/// Flags) — the batched writer dispatches by exhaustive match instead of
/// resolving a dotted path against the driver.
#[derive(Debug, Clone)]
pub enum WriteTask {
  CreateEntityFact {
    entity_id: i64,
    facts: Vec<String>,
    embeddings: Vec<Vec<u8>>,
    now: DateTime<Utc>,
  },
  CreateKnowledgeGraph {
    entity_id: i64,
    subject: String,
    predicate: String,
    object: String,
    now: DateTime<Utc>,
  },
  CreateProcessAttribute {
    process_id: i64,
    content: String,
    now: DateTime<Utc>,
  },
  UpdateConversationSummary {
    conversation_id: i64,
    summary: String,
  },
}
