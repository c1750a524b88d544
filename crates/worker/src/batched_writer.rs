use memori_shared::{MemoriConfig, MemoriError};
use memori_storage::{StorageAdapter, StorageDriver};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};
use tracing::{error, info, warn};

use crate::connect::ConnectFn;
use crate::write_task::WriteTask;

/// Applies staged writes durably and in batches, independent of the
/// augmentation workers that produced them. One background task, one
/// bounded queue, one long-lived connection borrowed on start.
pub struct BatchedWriter {
  sender: mpsc::Sender<WriteTask>,
}

impl BatchedWriter {
  pub fn spawn(connect: ConnectFn, config: MemoriConfig) -> Self {
    let (sender, receiver) = mpsc::channel(config.batched_writer_queue_size);
    tokio::spawn(Self::run(connect, config, receiver));
    Self { sender }
  }

  /// Returns `false` if the queue is full (or the writer has shut down) —
  /// the caller is then free to drop the write, since augmentation is
  /// best-effort by design.
  pub fn enqueue_write(&self, task: WriteTask) -> bool {
    self.sender.try_send(task).is_ok()
  }

  async fn run(connect: ConnectFn, config: MemoriConfig, mut receiver: mpsc::Receiver<WriteTask>) {
    let batch_timeout = Duration::from_secs_f64(config.batch_timeout_secs);

    loop {
      let adapter = match connect().await {
        Ok(adapter) => adapter,
        Err(err) => {
          error!(error = %err, "batched writer failed to acquire a connection, retrying in 1s");
          sleep(Duration::from_secs(1)).await;
          continue;
        }
      };

      Self::drain_loop(&adapter, &mut receiver, config.batch_size, batch_timeout).await;

      // `drain_loop` only returns when the channel has closed (all
      // senders dropped) — nothing left to do.
      if receiver.is_closed() {
        info!("batched writer channel closed, shutting down");
        return;
      }
    }
  }

  async fn drain_loop(adapter: &StorageAdapter, receiver: &mut mpsc::Receiver<WriteTask>, batch_size: usize, batch_timeout: Duration) {
    loop {
      let batch = Self::collect_batch(receiver, batch_size, batch_timeout).await;

      let Some(batch) = batch else {
        return;
      };

      if batch.is_empty() {
        sleep(batch_timeout).await;
        continue;
      }

      if let Err(err) = Self::apply_batch(adapter, batch).await {
        warn!(error = %err, "batch rolled back");
      }
    }
  }

  /// Drains up to `batch_size` tasks, bounded by `batch_timeout`. Returns
  /// `None` once the channel is closed and empty.
  async fn collect_batch(receiver: &mut mpsc::Receiver<WriteTask>, batch_size: usize, batch_timeout: Duration) -> Option<Vec<WriteTask>> {
    let mut batch = Vec::with_capacity(batch_size);

    match receiver.recv().await {
      Some(task) => batch.push(task),
      None => return None,
    }

    let deadline = tokio::time::Instant::now() + batch_timeout;
    while batch.len() < batch_size {
      let Some(remaining) = deadline.checked_duration_since(tokio::time::Instant::now()) else {
        break;
      };
      match timeout(remaining, receiver.recv()).await {
        Ok(Some(task)) => batch.push(task),
        Ok(None) => break,
        Err(_) => break,
      }
    }

    Some(batch)
  }

  async fn apply_batch(adapter: &StorageAdapter, batch: Vec<WriteTask>) -> Result<(), MemoriError> {
    let txn = adapter.begin().await?;

    let result: Result<(), MemoriError> = async {
      for task in batch {
        Self::apply_one(txn.connection(), task).await?;
      }
      Ok(())
    }
    .await;

    match result {
      Ok(()) => {
        txn.flush().await?;
        txn.commit().await
      }
      Err(err) => {
        let _ = txn.rollback().await;
        Err(err)
      }
    }
  }

  async fn apply_one<C: sea_orm::ConnectionTrait>(conn: &C, task: WriteTask) -> Result<(), MemoriError> {
    match task {
      WriteTask::CreateEntityFact { entity_id, facts, embeddings, now } => {
        StorageDriver::entity_fact_create(conn, entity_id, &facts, &embeddings, now).await?;
      }
      WriteTask::CreateKnowledgeGraph { entity_id, subject, predicate, object, now } => {
        StorageDriver::knowledge_graph_create(conn, entity_id, &subject, &predicate, &object, now).await?;
      }
      WriteTask::CreateProcessAttribute { process_id, content, now } => {
        StorageDriver::process_attribute_create(conn, process_id, &content, now).await?;
      }
      WriteTask::UpdateConversationSummary { conversation_id, summary } => {
        StorageDriver::conversation_update_summary(conn, conversation_id, &summary).await?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use memori_migration::MigrationRunner;
  use sea_orm::Database;

  use super::*;
  use crate::connect::connect_fn;

  #[tokio::test]
  async fn enqueued_writes_are_eventually_applied() {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    MigrationRunner::run(&connection, &memori_migration::revisions()).await.unwrap();

    let probe = StorageAdapter::from_connection(connection.clone(), false);
    let process_id = {
      let txn = probe.begin().await.unwrap();
      let id = StorageDriver::process_create(txn.connection(), "proc-1").await.unwrap();
      txn.commit().await.unwrap();
      id
    };

    let mut config = MemoriConfig::default();
    config.batch_size = 4;
    config.batch_timeout_secs = 0.02;

    let writer = BatchedWriter::spawn(
      connect_fn(move || {
        let connection = connection.clone();
        async move { Ok(StorageAdapter::from_connection(connection, false)) }
      }),
      config,
    );

    for i in 0..10 {
      assert!(writer.enqueue_write(WriteTask::CreateProcessAttribute {
        process_id,
        content: format!("fact {i}"),
        now: Utc::now(),
      }));
    }

    tokio::time::sleep(Duration::from_millis(200)).await;

    let txn = probe.begin().await.unwrap();
    let first_id = StorageDriver::process_attribute_create(txn.connection(), process_id, "fact 3", Utc::now()).await.unwrap();
    let second_id = StorageDriver::process_attribute_create(txn.connection(), process_id, "fact 3", Utc::now()).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(first_id, second_id, "the background writer's row for 'fact 3' should already exist and dedup");
  }
}
