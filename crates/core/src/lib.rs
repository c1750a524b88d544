mod adapters;
pub use adapters::{AnthropicAdapter, LlmAdapter, OpenAiAdapter, adapter_for};

mod cache;
pub use cache::AttributionCache;

mod interceptor;
pub use interceptor::{AugmentationInput, AugmentationSink, Interceptor, NullAugmentationSink};

mod recall;
pub use recall::{CONTEXT_CLOSE, CONTEXT_OPEN, RecallEngine, RecalledFact};

mod writer;
pub use writer::{Exchange, ExchangeWriter};

pub use memori_shared::{MemoriConfig, MemoriError, MemoriResult, Message, MessageRole};

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};
  use memori_embeddings::{EmbeddingConfig, EmbeddingService};
  use memori_migration::MigrationRunner;
  use memori_storage::StorageAdapter;
  use sea_orm::Database;
  use serde_json::json;
  use uuid::Uuid;

  use super::*;

  async fn test_storage() -> StorageAdapter {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    MigrationRunner::run(&connection, &memori_migration::revisions()).await.unwrap();
    StorageAdapter::from_connection(connection, false)
  }

  #[tokio::test]
  async fn first_turn_persists_one_user_message() {
    let storage = test_storage().await;
    let embeddings = EmbeddingService::new(EmbeddingConfig::default());
    let config = MemoriConfig::default();
    let mut cache = AttributionCache::default();
    let session_uuid = Uuid::new_v4();

    let interceptor = Interceptor {
      storage: &storage,
      embeddings: &embeddings,
      config: &config,
      provider: "openai",
      configured_entity_external_id: Some("user-123"),
      configured_process_external_id: None,
      session_uuid,
    };

    let payload = json!({ "messages": [{ "role": "user", "content": "hello" }] });
    let now = Utc::now();

    let response = interceptor
      .invoke(&mut cache, &NullAugmentationSink, payload.clone(), now, |sent| async move {
        assert_eq!(sent["messages"], payload["messages"]);
        Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "hi there" } }] }))
      })
      .await
      .unwrap();

    assert_eq!(response["choices"][0]["message"]["content"], "hi there");

    let conversation_id = cache.conversation_id.unwrap();
    let messages = memori_storage::StorageDriver::messages_read(storage.connection(), conversation_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[0].content, "hello");
  }

  #[tokio::test]
  async fn rollover_after_timeout_starts_a_new_conversation() {
    let storage = test_storage().await;
    let embeddings = EmbeddingService::new(EmbeddingConfig::default());
    let config = MemoriConfig::default();
    let mut cache = AttributionCache::default();
    let session_uuid = Uuid::new_v4();

    let interceptor = Interceptor {
      storage: &storage,
      embeddings: &embeddings,
      config: &config,
      provider: "openai",
      configured_entity_external_id: Some("user-123"),
      configured_process_external_id: None,
      session_uuid,
    };

    let t0 = Utc::now();
    interceptor
      .invoke(&mut cache, &NullAugmentationSink, json!({ "messages": [{"role": "user", "content": "hello"}] }), t0, |_| async {
        Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "hi" } }] }))
      })
      .await
      .unwrap();
    let first_conversation = cache.conversation_id.unwrap();

    let later = t0 + Duration::minutes(31);
    interceptor
      .invoke(
        &mut cache,
        &NullAugmentationSink,
        json!({ "messages": [{"role": "user", "content": "again"}] }),
        later,
        |_| async { Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "hi again" } }] })) },
      )
      .await
      .unwrap();

    assert_ne!(cache.conversation_id.unwrap(), first_conversation);
  }
}
