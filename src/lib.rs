mod registration;
pub use registration::{InterceptedClient, Registered, register};

pub mod anthropic {
  pub use crate::registration::register;
}

pub mod openai {
  pub use crate::registration::register;
}

use std::future::Future;

use chrono::Utc;
use memori_core::{AttributionCache, AugmentationSink, Interceptor, NullAugmentationSink, RecalledFact};
use memori_embeddings::{EmbeddingConfig, EmbeddingService};
pub use memori_shared::{MemoriConfig, MemoriError, MemoriResult, Message, MessageRole};
use memori_storage::{StorageAdapter, StorageDriver};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const MAX_ATTRIBUTION_LEN: usize = 100;

/// The package's single entry point: a storage handle, an embedding
/// service, a configuration, and the attribution/session state an
/// application mutates between calls. Cheap to hold behind an `Arc` and
/// share across request handlers.
pub struct Memori {
  storage: StorageAdapter,
  embeddings: EmbeddingService,
  config: MemoriConfig,
  sink: Arc<dyn AugmentationSink>,
  entity_external_id: Mutex<Option<String>>,
  process_external_id: Mutex<Option<String>>,
  session_uuid: Mutex<Uuid>,
  cache: Mutex<AttributionCache>,
}

impl Memori {
  /// Migrates `storage` to the latest revision (a no-op if already
  /// current) and wraps it into a handle with no attribution or
  /// augmentation sink configured yet.
  pub async fn open(storage: StorageAdapter, config: MemoriConfig) -> Result<Self, MemoriError> {
    memori_migration::MigrationRunner::run(storage.connection(), &memori_migration::revisions()).await?;

    Ok(Self {
      storage,
      embeddings: EmbeddingService::new(EmbeddingConfig::from_env()),
      config,
      sink: Arc::new(NullAugmentationSink),
      entity_external_id: Mutex::new(None),
      process_external_id: Mutex::new(None),
      session_uuid: Mutex::new(Uuid::new_v4()),
      cache: Mutex::new(AttributionCache::default()),
    })
  }

  /// Swaps in a real augmentation sink (an `AugmentationWorkerPool`, in
  /// practice) once the caller has one wired up. Handles opened without
  /// calling this stay on the no-op sink, so the write path still
  /// works for callers who only want recall and persistence.
  pub fn with_sink(mut self, sink: Arc<dyn AugmentationSink>) -> Self {
    self.sink = sink;
    self
  }

  /// Sets the `(entity, process)` pair identifying who and what future
  /// exchanges belong to, resetting the resolved-id cache so the next
  /// exchange re-resolves against the new attribution.
  pub async fn attribution(&self, entity_external_id: Option<&str>, process_external_id: Option<&str>) -> Result<(), MemoriError> {
    if entity_external_id.is_some_and(|id| id.len() > MAX_ATTRIBUTION_LEN) || process_external_id.is_some_and(|id| id.len() > MAX_ATTRIBUTION_LEN) {
      return Err(MemoriError::Configuration(format!("attribution identifiers must be at most {MAX_ATTRIBUTION_LEN} characters")));
    }

    *self.entity_external_id.lock().await = entity_external_id.map(str::to_string);
    *self.process_external_id.lock().await = process_external_id.map(str::to_string);
    *self.cache.lock().await = AttributionCache::default();
    Ok(())
  }

  /// Generates a fresh session UUID and clears the session/conversation
  /// half of the cache (the entity/process ids survive, since they are
  /// attribution-scoped, not session-scoped).
  pub async fn new_session(&self) -> Uuid {
    let session_uuid = Uuid::new_v4();
    *self.session_uuid.lock().await = session_uuid;
    self.cache.lock().await.reset_session();
    session_uuid
  }

  /// Adopts a caller-supplied session UUID (e.g. one persisted across a
  /// process restart), clearing the cached session/conversation ids the
  /// same way `new_session` does.
  pub async fn set_session(&self, session_uuid: Uuid) {
    *self.session_uuid.lock().await = session_uuid;
    self.cache.lock().await.reset_session();
  }

  /// Returns durable facts relevant to `query` for the configured
  /// entity, without touching any provider. Returns an empty list if no
  /// entity is configured.
  pub async fn recall(&self, query: &str, limit: usize) -> Result<Vec<RecalledFact>, MemoriError> {
    let Some(external_id) = self.entity_external_id.lock().await.clone() else {
      return Ok(Vec::new());
    };

    let entity_id = {
      let mut cache = self.cache.lock().await;
      if cache.entity_id.is_none() {
        cache.entity_id = Some(StorageDriver::entity_create(self.storage.connection(), &external_id).await?);
      }
      cache.entity_id.expect("resolved above")
    };

    memori_core::RecallEngine::recall(&self.storage, &self.embeddings, &self.config, entity_id, query, limit).await
  }

  /// Wraps one provider call: injects recall/history, persists the
  /// exchange, and enqueues it for augmentation. `call` is handed the
  /// canonical payload (with `_memori_injected_count` set) and must
  /// return the provider's raw JSON response unchanged.
  pub async fn invoke<F, Fut>(&self, provider: &str, payload: Value, call: F) -> Result<Value, MemoriError>
  where
    F: FnOnce(Value) -> Fut,
    Fut: Future<Output = Result<Value, MemoriError>>,
  {
    let entity_external_id = self.entity_external_id.lock().await.clone();
    let process_external_id = self.process_external_id.lock().await.clone();
    let session_uuid = *self.session_uuid.lock().await;
    let mut cache = self.cache.lock().await;

    let interceptor = Interceptor {
      storage: &self.storage,
      embeddings: &self.embeddings,
      config: &self.config,
      provider,
      configured_entity_external_id: entity_external_id.as_deref(),
      configured_process_external_id: process_external_id.as_deref(),
      session_uuid,
    };

    interceptor.invoke(&mut cache, self.sink.as_ref(), payload, Utc::now(), call).await
  }
}

#[cfg(test)]
mod tests {
  use memori_storage::Dialect;
  use sea_orm::Database;
  use serde_json::json;

  use super::*;

  async fn test_memori() -> Memori {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    let storage = StorageAdapter::from_connection(connection, false);
    assert_eq!(storage.dialect(), Dialect::Sqlite);
    Memori::open(storage, MemoriConfig::default()).await.unwrap()
  }

  #[tokio::test]
  async fn attribution_rejects_overlong_identifiers() {
    let memori = test_memori().await;
    let overlong = "x".repeat(MAX_ATTRIBUTION_LEN + 1);
    let result = memori.attribution(Some(&overlong), None).await;
    assert!(matches!(result, Err(MemoriError::Configuration(_))));
  }

  #[tokio::test]
  async fn new_session_clears_conversation_but_keeps_entity() {
    let memori = test_memori().await;
    memori.attribution(Some("user-123"), None).await.unwrap();

    memori
      .invoke("openai", json!({ "messages": [{"role": "user", "content": "hello"}] }), |_| async {
        Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "hi" } }] }))
      })
      .await
      .unwrap();

    let entity_id_before = memori.cache.lock().await.entity_id;
    assert!(entity_id_before.is_some());

    memori.new_session().await;

    let cache = memori.cache.lock().await;
    assert_eq!(cache.entity_id, entity_id_before);
    assert!(cache.conversation_id.is_none());
  }

  #[tokio::test]
  async fn recall_with_no_attribution_returns_empty() {
    let memori = test_memori().await;
    let facts = memori.recall("anything", 5).await.unwrap();
    assert!(facts.is_empty());
  }
}
