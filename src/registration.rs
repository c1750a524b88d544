use std::sync::Arc;

use async_trait::async_trait;
use memori_shared::MemoriError;
use serde_json::Value;

use crate::Memori;

/// A provider client's wrapped method, the seam `Memori::invoke` calls
/// through. One implementation per provider family; the method whose
/// signature is "preserved exactly" per the external interface is
/// `call_raw` — everything it is handed has already gone through
/// recall/history injection, and everything it returns is persisted and
/// forwarded to the caller unchanged.
#[async_trait]
pub trait InterceptedClient: Send + Sync {
  fn provider(&self) -> &'static str;

  async fn call_raw(&self, payload: Value) -> Result<Value, MemoriError>;
}

/// A client wrapped for interception. Rust has no attribute interception
/// to monkeypatch a bound method in place, so wrapping is a value-level
/// construction instead: `register` builds one of these around the raw
/// client and a handle, and `call` is what an application calls in place
/// of the client's own method.
pub struct Registered<C> {
  client: C,
  memori: Arc<Memori>,
}

impl<C: InterceptedClient> Registered<C> {
  pub async fn call(&self, payload: Value) -> Result<Value, MemoriError> {
    let client = &self.client;
    let provider = client.provider();
    self.memori.invoke(provider, payload, |sent| async move { client.call_raw(sent).await }).await
  }

  pub fn client(&self) -> &C {
    &self.client
  }
}

/// Wraps `client` for interception through `memori`, storing the result
/// in `slot`. A `slot` that already holds a registration is left
/// untouched — re-registering the same client a second time is
/// observationally a no-op, matching the `_memori_installed` idempotency
/// flag the dynamic original sets on the client object itself.
pub fn register<C: InterceptedClient>(slot: &mut Option<Registered<C>>, client: C, memori: Arc<Memori>) {
  if slot.is_some() {
    return;
  }
  *slot = Some(Registered { client, memori });
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use memori_storage::StorageAdapter;
  use sea_orm::Database;
  use serde_json::json;

  use super::*;

  struct CountingClient {
    calls: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl InterceptedClient for CountingClient {
    fn provider(&self) -> &'static str {
      "openai"
    }

    async fn call_raw(&self, _payload: Value) -> Result<Value, MemoriError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "hi" } }] }))
    }
  }

  async fn test_memori() -> Arc<Memori> {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    let storage = StorageAdapter::from_connection(connection, false);
    Arc::new(Memori::open(storage, memori_shared::MemoriConfig::default()).await.unwrap())
  }

  #[tokio::test]
  async fn registering_twice_is_a_no_op() {
    let memori = test_memori().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let mut slot = None;
    register(&mut slot, CountingClient { calls: calls.clone() }, memori.clone());
    let first_client_calls = slot.as_ref().unwrap().client().calls.load(Ordering::SeqCst);

    register(&mut slot, CountingClient { calls: Arc::new(AtomicUsize::new(99)) }, memori.clone());
    let second_client_calls = slot.as_ref().unwrap().client().calls.load(Ordering::SeqCst);

    assert_eq!(first_client_calls, second_client_calls, "the second registration must not replace the first");

    let registered = slot.unwrap();
    registered.call(json!({ "messages": [{"role": "user", "content": "hi"}] })).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}
