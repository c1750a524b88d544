use serde::{Deserialize, Serialize};

/// A canonical message role. `System` messages carry the recall injection
/// and are never persisted (see `ConversationMessage` invariant).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
  System,
  User,
  Assistant,
  #[serde(other)]
  Other,
}

impl MessageRole {
  pub fn is_system(self) -> bool {
    matches!(self, Self::System)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::System => "system",
      Self::User => "user",
      Self::Assistant => "assistant",
      Self::Other => "other",
    }
  }
}

/// One formatted message in a canonical query/response list, the shape
/// every `LlmAdapter` normalizes a provider payload into.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
  pub role: MessageRole,
  pub content: String,
  /// Present on response-side messages (e.g. `"text"`); absent on query
  /// messages.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub r#type: Option<String>,
}

impl Message {
  pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
    Self {
      role,
      content: content.into(),
      r#type: None,
    }
  }

  pub fn is_user(&self) -> bool {
    matches!(self.role, MessageRole::User)
  }

  pub fn is_system(&self) -> bool {
    self.role.is_system()
  }
}
