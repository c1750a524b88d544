mod adapter;
pub use adapter::{StorageAdapter, StorageTransaction};

mod dialect;
pub use dialect::Dialect;

mod driver;
pub use driver::{StorageDriver, StoredMessage};

#[cfg(test)]
mod tests {
  use memori_migration::MigrationRunner;
  use sea_orm::Database;

  use super::*;

  async fn test_adapter() -> StorageAdapter {
    let connection = Database::connect("sqlite::memory:").await.unwrap();
    MigrationRunner::run(&connection, &memori_migration::revisions()).await.unwrap();
    StorageAdapter::from_connection(connection, false)
  }

  #[tokio::test]
  async fn entity_create_is_idempotent_by_external_id() {
    let adapter = test_adapter().await;
    let txn = adapter.begin().await.unwrap();
    let first = StorageDriver::entity_create(txn.connection(), "user-123").await.unwrap();
    let second = StorageDriver::entity_create(txn.connection(), "user-123").await.unwrap();
    assert_eq!(first, second);
    txn.commit().await.unwrap();
  }

  #[tokio::test]
  async fn entity_fact_dedup_increments_num_times() {
    let adapter = test_adapter().await;
    let txn = adapter.begin().await.unwrap();
    let entity_id = StorageDriver::entity_create(txn.connection(), "user-123").await.unwrap();

    let now = chrono::Utc::now();
    let facts = vec!["favorite color is blue".to_string()];
    let embeddings = vec![vec![0u8; 4]];

    StorageDriver::entity_fact_create(txn.connection(), entity_id, &facts, &embeddings, now).await.unwrap();
    StorageDriver::entity_fact_create(txn.connection(), entity_id, &facts, &embeddings, now).await.unwrap();
    StorageDriver::entity_fact_create(txn.connection(), entity_id, &facts, &embeddings, now).await.unwrap();

    let rows = StorageDriver::entity_fact_get_embeddings(txn.connection(), entity_id, 10).await.unwrap();
    assert_eq!(rows.len(), 1);

    txn.commit().await.unwrap();
  }

  #[tokio::test]
  async fn conversation_rollover_respects_timeout() {
    let adapter = test_adapter().await;
    let txn = adapter.begin().await.unwrap();
    let session_id = StorageDriver::session_create(txn.connection(), uuid::Uuid::new_v4(), None, None).await.unwrap();

    let t0 = chrono::Utc::now();
    let first = StorageDriver::conversation_create(txn.connection(), session_id, 30, t0).await.unwrap();
    let soon = t0 + chrono::Duration::seconds(1);
    let second = StorageDriver::conversation_create(txn.connection(), session_id, 30, soon).await.unwrap();
    assert_eq!(first, second);

    let later = t0 + chrono::Duration::minutes(31);
    let third = StorageDriver::conversation_create(txn.connection(), session_id, 30, later).await.unwrap();
    assert_ne!(first, third);

    txn.commit().await.unwrap();
  }
}
