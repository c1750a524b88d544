use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use memori_core::{AugmentationInput, AugmentationSink};
use memori_shared::{MemoriConfig, MemoriError};
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, warn};

use crate::augmentation::{Augmentation, AugmentationContext};
use crate::batched_writer::BatchedWriter;
use crate::connect::ConnectFn;

/// Offloads derivation work off the request path: one background thread
/// hosting a single cooperative event loop, a bounded semaphore gating
/// concurrent tasks, a registry of `Augmentation` plugins run in
/// registration order per task.
///
/// Dropping the pool does not cancel in-flight tasks; it only stops new
/// enqueues from being accepted (the tasks themselves were already
/// `tokio::spawn`ed and run to completion against their own connection).
pub struct AugmentationWorkerPool {
  semaphore: Arc<Semaphore>,
  augmentations: Arc<Vec<Box<dyn Augmentation>>>,
  connect: ConnectFn,
  writer: Arc<BatchedWriter>,
  active: Arc<AtomicBool>,
  stored_error: Arc<Mutex<Option<String>>>,
}

impl AugmentationWorkerPool {
  pub fn new(connect: ConnectFn, writer: Arc<BatchedWriter>, config: &MemoriConfig, augmentations: Vec<Box<dyn Augmentation>>) -> Self {
    Self {
      semaphore: Arc::new(Semaphore::new(config.augmentation_worker_count)),
      augmentations: Arc::new(augmentations),
      connect,
      writer,
      active: Arc::new(AtomicBool::new(true)),
      stored_error: Arc::new(Mutex::new(None)),
    }
  }

  pub fn is_active(&self) -> bool {
    self.active.load(Ordering::SeqCst)
  }

  async fn run_task(
    semaphore: Arc<Semaphore>,
    augmentations: Arc<Vec<Box<dyn Augmentation>>>,
    connect: ConnectFn,
    writer: Arc<BatchedWriter>,
    active: Arc<AtomicBool>,
    stored_error: Arc<Mutex<Option<String>>>,
    input: AugmentationInput,
  ) {
    let _permit = match semaphore.acquire_owned().await {
      Ok(permit) => permit,
      Err(_) => return,
    };

    let adapter = match connect().await {
      Ok(adapter) => adapter,
      Err(err) => {
        error!(error = %err, "augmentation task failed to acquire a connection");
        return;
      }
    };

    let mut ctx = AugmentationContext::new(input);

    for augmentation in augmentations.iter() {
      match augmentation.process(&mut ctx, adapter.connection()).await {
        Ok(()) => {}
        Err(MemoriError::QuotaExceeded(message)) => {
          active.store(false, Ordering::SeqCst);
          *stored_error.lock().await = Some(message);
          return;
        }
        Err(err) => {
          warn!(augmentation = augmentation.name(), error = %err, "augmentation failed, skipping");
        }
      }
    }

    for write in ctx.writes {
      if !writer.enqueue_write(write) {
        warn!("batched writer queue full, dropping a staged augmentation write");
      }
    }
  }
}

#[async_trait]
impl AugmentationSink for AugmentationWorkerPool {
  async fn enqueue(&self, input: AugmentationInput) -> Result<(), MemoriError> {
    if !self.is_active() {
      let message = self.stored_error.lock().await.clone().unwrap_or_else(|| "quota exceeded".to_string());
      return Err(MemoriError::QuotaExceeded(message));
    }

    tokio::spawn(Self::run_task(
      self.semaphore.clone(),
      self.augmentations.clone(),
      self.connect.clone(),
      self.writer.clone(),
      self.active.clone(),
      self.stored_error.clone(),
      input,
    ));

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use memori_storage::{Dialect, StorageAdapter};
  use sea_orm::Database;

  use super::*;
  use crate::connect::connect_fn;

  struct AlwaysQuotaExceeded;

  #[async_trait]
  impl Augmentation for AlwaysQuotaExceeded {
    fn name(&self) -> &'static str {
      "always_quota_exceeded"
    }

    async fn process(&self, _ctx: &mut AugmentationContext, _conn: &sea_orm::DatabaseConnection) -> Result<(), MemoriError> {
      Err(MemoriError::QuotaExceeded("quota exceeded".to_string()))
    }
  }

  fn dummy_input() -> AugmentationInput {
    AugmentationInput {
      entity_id: Some(1),
      process_id: None,
      conversation_id: 1,
      provider: "openai".to_string(),
      query_messages: vec![],
      response_messages: vec![],
      system_prompt: None,
      storage_dialect: Dialect::Sqlite,
    }
  }

  #[tokio::test]
  async fn second_enqueue_raises_after_quota_exceeded() {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    let writer = Arc::new(BatchedWriter::spawn(
      connect_fn(move || {
        let connection = connection.clone();
        async move { Ok(StorageAdapter::from_connection(connection, false)) }
      }),
      MemoriConfig::default(),
    ));

    let pool = AugmentationWorkerPool::new(
      connect_fn(move || async move {
        let connection = Database::connect("sqlite::memory:").await.map_err(MemoriError::storage)?;
        Ok(StorageAdapter::from_connection(connection, false))
      }),
      writer,
      &MemoriConfig::default(),
      vec![Box::new(AlwaysQuotaExceeded)],
    );

    assert!(pool.enqueue(dummy_input()).await.is_ok());

    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = pool.enqueue(dummy_input()).await;
    assert!(matches!(second, Err(MemoriError::QuotaExceeded(_))));
  }
}
