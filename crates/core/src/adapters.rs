use memori_shared::{Message, MessageRole};
use memori_storage::StoredMessage;
use serde_json::{Value, json};

/// Translates a provider-shaped payload into the canonical
/// `(messages[], response[])` pair the writer persists, and knows how to
/// fold recalled facts and prior-conversation history back into a
/// provider's native request shape.
///
/// Every registered adapter is one of two shapes, per §4.7/§4.8: the
/// Anthropic family (a top-level `system` string, `messages` carrying
/// only user/assistant turns) and the OpenAI family (`messages` with an
/// optional leading `role: "system"` entry).
pub trait LlmAdapter: Send + Sync {
  fn provider(&self) -> &'static str;

  /// Drops the first `_memori_injected_count` messages (the prepended
  /// recall/history prefix) before returning the canonical query.
  fn get_formatted_query(&self, payload: &Value) -> Vec<Message>;

  fn get_formatted_response(&self, payload: &Value) -> Vec<Message>;

  /// Appends the `<memori_context>` addendum to the payload's system
  /// slot, creating one if the shape doesn't have one yet.
  fn inject_recall_addendum(&self, payload: &mut Value, addendum: &str);

  /// Prepends `history` (oldest first) to the absolute front of the
  /// payload's messages array, ahead of any leading system/recall
  /// message already there. Returns how many messages were injected,
  /// which the caller records as `_memori_injected_count` — the skip
  /// count in `get_formatted_query` only has to account for the history
  /// entries this inserts, since a leading system message is dropped
  /// separately by the writer's `is_system` filter regardless of
  /// position.
  fn inject_history(&self, payload: &mut Value, history: &[StoredMessage]) -> usize;
}

fn injected_count(payload: &Value) -> usize {
  payload.get("_memori_injected_count").and_then(Value::as_u64).unwrap_or(0) as usize
}

fn role_from_str(role: &str) -> MessageRole {
  match role {
    "system" => MessageRole::System,
    "user" => MessageRole::User,
    "assistant" => MessageRole::Assistant,
    _ => MessageRole::Other,
  }
}

fn stored_message_role_str(message: &StoredMessage) -> &str {
  message.role.as_str()
}

// ---------------------------------------------------------------------
// OpenAI family
// ---------------------------------------------------------------------

pub struct OpenAiAdapter;

impl LlmAdapter for OpenAiAdapter {
  fn provider(&self) -> &'static str {
    "openai"
  }

  fn get_formatted_query(&self, payload: &Value) -> Vec<Message> {
    let skip = injected_count(payload);
    payload
      .get("messages")
      .and_then(Value::as_array)
      .map(|messages| {
        messages
          .iter()
          .skip(skip)
          .filter_map(|m| {
            let role = m.get("role")?.as_str()?;
            let content = m.get("content")?.as_str()?;
            Some(Message::new(role_from_str(role), content))
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn get_formatted_response(&self, payload: &Value) -> Vec<Message> {
    payload
      .get("choices")
      .and_then(Value::as_array)
      .map(|choices| {
        choices
          .iter()
          .filter_map(|choice| {
            let message = choice.get("message")?;
            let role = message.get("role").and_then(Value::as_str).unwrap_or("assistant");
            let content = message.get("content")?.as_str()?;
            let mut m = Message::new(role_from_str(role), content);
            m.r#type = Some("text".to_string());
            Some(m)
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn inject_recall_addendum(&self, payload: &mut Value, addendum: &str) {
    let messages = payload.as_object_mut().and_then(|o| o.get_mut("messages")).and_then(Value::as_array_mut);
    let Some(messages) = messages else {
      return;
    };

    let has_leading_system = messages.first().map(|m| m.get("role").and_then(Value::as_str) == Some("system")).unwrap_or(false);

    if has_leading_system {
      if let Some(existing) = messages[0].get("content").and_then(Value::as_str) {
        let merged = format!("{existing}\n\n{addendum}");
        messages[0]["content"] = json!(merged);
      }
    } else {
      let stripped = addendum.trim_start_matches('\n');
      messages.insert(0, json!({ "role": "system", "content": stripped }));
    }
  }

  fn inject_history(&self, payload: &mut Value, history: &[StoredMessage]) -> usize {
    if history.is_empty() {
      return 0;
    }

    let Some(messages) = payload.as_object_mut().and_then(|o| o.get_mut("messages")).and_then(Value::as_array_mut) else {
      return 0;
    };

    let injected: Vec<Value> = history
      .iter()
      .map(|m| json!({ "role": stored_message_role_str(m), "content": m.content }))
      .collect();
    let count = injected.len();

    for (offset, message) in injected.into_iter().enumerate() {
      messages.insert(offset, message);
    }

    count
  }
}

// ---------------------------------------------------------------------
// Anthropic family
// ---------------------------------------------------------------------

pub struct AnthropicAdapter;

impl LlmAdapter for AnthropicAdapter {
  fn provider(&self) -> &'static str {
    "anthropic"
  }

  fn get_formatted_query(&self, payload: &Value) -> Vec<Message> {
    let skip = injected_count(payload);
    payload
      .get("messages")
      .and_then(Value::as_array)
      .map(|messages| {
        messages
          .iter()
          .skip(skip)
          .filter_map(|m| {
            let role = m.get("role")?.as_str()?;
            let content = m.get("content")?.as_str()?;
            Some(Message::new(role_from_str(role), content))
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn get_formatted_response(&self, payload: &Value) -> Vec<Message> {
    let role = payload.get("role").and_then(Value::as_str).unwrap_or("assistant");
    payload
      .get("content")
      .and_then(Value::as_array)
      .map(|blocks| {
        blocks
          .iter()
          .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
          .filter_map(|b| {
            let text = b.get("text")?.as_str()?;
            let mut m = Message::new(role_from_str(role), text);
            m.r#type = Some("text".to_string());
            Some(m)
          })
          .collect()
      })
      .unwrap_or_default()
  }

  fn inject_recall_addendum(&self, payload: &mut Value, addendum: &str) {
    let Some(object) = payload.as_object_mut() else { return };
    match object.get("system").and_then(Value::as_str) {
      Some(existing) => {
        let merged = format!("{existing}\n\n{addendum}");
        object.insert("system".to_string(), json!(merged));
      }
      None => {
        object.insert("system".to_string(), json!(addendum));
      }
    }
  }

  fn inject_history(&self, payload: &mut Value, history: &[StoredMessage]) -> usize {
    if history.is_empty() {
      return 0;
    }

    let Some(messages) = payload.as_object_mut().and_then(|o| o.get_mut("messages")).and_then(Value::as_array_mut) else {
      return 0;
    };

    let injected: Vec<Value> = history
      .iter()
      .map(|m| json!({ "role": stored_message_role_str(m), "content": m.content }))
      .collect();
    let count = injected.len();

    for (offset, message) in injected.into_iter().enumerate() {
      messages.insert(offset, message);
    }

    count
  }
}

/// The static provider registry, matched by identifier rather than
/// duck-typed object shape (see DESIGN.md Redesign Flags).
pub fn adapter_for(provider: &str) -> Option<Box<dyn LlmAdapter>> {
  match provider {
    "openai" => Some(Box::new(OpenAiAdapter)),
    "anthropic" => Some(Box::new(AnthropicAdapter)),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn openai_query_drops_injected_prefix() {
    let payload = json!({
      "_memori_injected_count": 1,
      "messages": [
        { "role": "system", "content": "injected" },
        { "role": "user", "content": "hello" },
      ]
    });
    let messages = OpenAiAdapter.get_formatted_query(&payload);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hello");
  }

  #[test]
  fn openai_history_injection_stays_aligned_with_leading_system_message() {
    use chrono::Utc;
    use memori_storage::StoredMessage;

    let mut payload = json!({ "messages": [
      { "role": "system", "content": "<memori_context>\n- likes tea\n</memori_context>" },
      { "role": "user", "content": "and again?" },
    ] });

    let history = vec![
      StoredMessage { id: 1, role: "user".to_string(), r#type: None, content: "hello".to_string(), date_created: Utc::now() },
      StoredMessage { id: 2, role: "assistant".to_string(), r#type: None, content: "hi there".to_string(), date_created: Utc::now() },
    ];

    let injected_count = OpenAiAdapter.inject_history(&mut payload, &history);
    payload["_memori_injected_count"] = json!(injected_count);

    let messages = OpenAiAdapter.get_formatted_query(&payload);
    assert_eq!(messages.len(), 2, "the two injected history turns must be stripped, leaving only system + the new user turn");
    assert!(messages[0].is_system());
    assert_eq!(messages[1].content, "and again?");
  }

  #[test]
  fn openai_recall_injection_inserts_leading_system_message() {
    let mut payload = json!({ "messages": [{ "role": "user", "content": "hi" }] });
    OpenAiAdapter.inject_recall_addendum(&mut payload, "<memori_context>\n- fact\n</memori_context>");
    let messages = payload["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("fact"));
  }

  #[test]
  fn anthropic_recall_injection_appends_to_system_field() {
    let mut payload = json!({ "system": "be nice", "messages": [] });
    AnthropicAdapter.inject_recall_addendum(&mut payload, "<memori_context>...</memori_context>");
    assert!(payload["system"].as_str().unwrap().starts_with("be nice"));
    assert!(payload["system"].as_str().unwrap().contains("memori_context"));
  }
}
