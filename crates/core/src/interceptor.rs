use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memori_embeddings::EmbeddingService;
use memori_shared::{MemoriConfig, MemoriError, Message};
use memori_storage::{Dialect, StorageAdapter, StorageDriver};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::adapters::{LlmAdapter, adapter_for};
use crate::cache::AttributionCache;
use crate::recall::{CONTEXT_CLOSE, CONTEXT_OPEN, RecallEngine};
use crate::writer::{Exchange, ExchangeWriter};

/// One completed exchange's derivation-worthy payload, handed to the
/// augmentation worker pool after the synchronous write succeeds.
#[derive(Debug, Clone)]
pub struct AugmentationInput {
  pub entity_id: Option<i64>,
  pub process_id: Option<i64>,
  pub conversation_id: i64,
  pub provider: String,
  pub query_messages: Vec<Message>,
  pub response_messages: Vec<Message>,
  pub system_prompt: Option<String>,
  pub storage_dialect: Dialect,
}

/// The enqueue side of the augmentation worker pool, implemented by
/// `memori_worker` so this crate never depends on it.
#[async_trait]
pub trait AugmentationSink: Send + Sync {
  async fn enqueue(&self, input: AugmentationInput) -> Result<(), MemoriError>;
}

/// A sink that drops everything, for callers who never configured
/// augmentation (e.g. `recall`-only usage, or tests of the write path in
/// isolation).
pub struct NullAugmentationSink;

#[async_trait]
impl AugmentationSink for NullAugmentationSink {
  async fn enqueue(&self, _input: AugmentationInput) -> Result<(), MemoriError> {
    Ok(())
  }
}

/// One wrapped provider method call: same signature and return semantics
/// as the underlying method, with recall, history injection, persistence,
/// and augmentation enqueueing layered transparently around it.
pub struct Interceptor<'a> {
  pub storage: &'a StorageAdapter,
  pub embeddings: &'a EmbeddingService,
  pub config: &'a MemoriConfig,
  pub provider: &'a str,
  pub configured_entity_external_id: Option<&'a str>,
  pub configured_process_external_id: Option<&'a str>,
  pub session_uuid: Uuid,
}

impl<'a> Interceptor<'a> {
  pub async fn invoke<F, Fut>(
    &self,
    cache: &mut AttributionCache,
    sink: &dyn AugmentationSink,
    mut payload: Value,
    now: DateTime<Utc>,
    call: F,
  ) -> Result<Value, MemoriError>
  where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<Value, MemoriError>>,
  {
    let llm_adapter = adapter_for(self.provider)
      .ok_or_else(|| MemoriError::ProviderIntercept(format!("no adapter registered for provider '{}'", self.provider)))?;

    self.inject_recalled_facts(cache, llm_adapter.as_ref(), &mut payload).await?;

    // Captured before history injection: history is prepended ahead of
    // any system message, so the system slot would no longer be leading
    // by the time `get_formatted_query` runs.
    let system_prompt = Self::extract_system_prompt(&payload);

    let injected_count = self.inject_conversation_messages(cache, llm_adapter.as_ref(), &mut payload).await?;
    if let Some(object) = payload.as_object_mut() {
      object.insert("_memori_injected_count".to_string(), json!(injected_count));
    }

    let response = call(payload.clone()).await?;

    let query_messages = llm_adapter.get_formatted_query(&payload);
    let response_messages = llm_adapter.get_formatted_response(&response);

    ExchangeWriter::persist(
      self.storage,
      cache,
      self.config,
      &Exchange {
        configured_entity_external_id: self.configured_entity_external_id,
        configured_process_external_id: self.configured_process_external_id,
        session_uuid: self.session_uuid,
        query_messages: &query_messages,
        response_messages: &response_messages,
        now,
      },
    )
    .await?;

    if let Some(conversation_id) = cache.conversation_id {
      let augmentation_query_messages = query_messages.iter().map(|m| Message {
        role: m.role,
        content: strip_context_block(&m.content),
        r#type: m.r#type.clone(),
      });

      let input = AugmentationInput {
        entity_id: cache.entity_id,
        process_id: cache.process_id,
        conversation_id,
        provider: self.provider.to_string(),
        query_messages: augmentation_query_messages.collect(),
        response_messages,
        system_prompt,
        storage_dialect: self.storage.dialect(),
      };
      sink.enqueue(input).await?;
    }

    Ok(response)
  }

  async fn inject_recalled_facts(
    &self,
    cache: &mut AttributionCache,
    llm_adapter: &dyn LlmAdapter,
    payload: &mut Value,
  ) -> Result<(), MemoriError> {
    let Some(entity_external_id) = self.configured_entity_external_id else {
      return Ok(());
    };

    if cache.entity_id.is_none() {
      cache.entity_id = Some(StorageDriver::entity_create(self.storage.connection(), entity_external_id).await?);
    }
    let entity_id = cache.entity_id.expect("resolved above");

    let Some(user_message) = Self::last_user_message(payload, llm_adapter) else {
      return Ok(());
    };

    let facts = RecallEngine::recall(
      self.storage,
      self.embeddings,
      self.config,
      entity_id,
      &user_message,
      self.config.recall_facts_limit,
    )
    .await?;

    if let Some(addendum) = RecallEngine::render_addendum(&facts) {
      llm_adapter.inject_recall_addendum(payload, &addendum);
    }

    Ok(())
  }

  async fn inject_conversation_messages(
    &self,
    cache: &AttributionCache,
    llm_adapter: &dyn LlmAdapter,
    payload: &mut Value,
  ) -> Result<usize, MemoriError> {
    let Some(conversation_id) = cache.conversation_id else {
      return Ok(0);
    };
    let history = StorageDriver::messages_read(self.storage.connection(), conversation_id).await?;
    Ok(llm_adapter.inject_history(payload, &history))
  }

  fn last_user_message(payload: &Value, llm_adapter: &dyn LlmAdapter) -> Option<String> {
    llm_adapter
      .get_formatted_query(payload)
      .into_iter()
      .rev()
      .find(|m| m.is_user())
      .map(|m| m.content)
  }

  /// The system prompt, taken from either shape's system slot, truncated
  /// at the `<memori_context>` delimiter so the recall block never leaks
  /// into what augmentation treats as "the" system prompt.
  fn extract_system_prompt(payload: &Value) -> Option<String> {
    if let Some(system) = payload.get("system").and_then(Value::as_str) {
      return Some(truncate_before_context(system));
    }
    let first = payload.get("messages")?.as_array()?.first()?;
    if first.get("role").and_then(Value::as_str) != Some("system") {
      return None;
    }
    Some(truncate_before_context(first.get("content")?.as_str()?))
  }
}

fn truncate_before_context(content: &str) -> String {
  let boundary = content.find(CONTEXT_OPEN).unwrap_or(content.len());
  content[..boundary].trim().to_string()
}

fn strip_context_block(content: &str) -> String {
  let Some(start) = content.find(CONTEXT_OPEN) else {
    return content.to_string();
  };
  let Some(end) = content.find(CONTEXT_CLOSE) else {
    return content.to_string();
  };
  let end = end + CONTEXT_CLOSE.len();
  format!("{}{}", &content[..start], &content[end..]).trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strip_context_block_removes_the_delimited_region() {
    let content = "be nice\n\n<memori_context>\n- fact\n</memori_context>";
    assert_eq!(strip_context_block(content), "be nice");
  }
}
