use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use memori_shared::MemoriError;
use memori_storage::StorageAdapter;

/// A zero-arg connection factory, the "connection-per-task" / "one
/// long-lived connection" primitive both the augmentation pool and the
/// batched writer are built around — each opens its own adapter rather
/// than sharing the request path's.
pub type ConnectFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<StorageAdapter, MemoriError>> + Send>> + Send + Sync>;

pub fn connect_fn<F, Fut>(f: F) -> ConnectFn
where
  F: Fn() -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<StorageAdapter, MemoriError>> + Send + 'static,
{
  Arc::new(move || Box::pin(f()))
}
