use memori_shared::MemoriError;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::dialect::Dialect;

/// Normalizes a raw database handle into the uniform operation surface
/// the driver and cache/writer layers build on: dialect detection,
/// transaction lifecycle, close. The adapter is constructed eagerly (the
/// connection is opened at construction) so failures surface before any
/// work is submitted.
pub struct StorageAdapter {
  connection: DatabaseConnection,
  dialect: Dialect,
}

impl StorageAdapter {
  /// Connect and detect dialect. `is_cockroachdb` tags a Postgres-wire
  /// connection as CockroachDB so retry/rollback policy applies
  /// correctly; it has no effect on other backends.
  pub async fn connect(database_url: &str, is_cockroachdb: bool) -> Result<Self, MemoriError> {
    let connection = Database::connect(database_url)
      .await
      .map_err(MemoriError::storage)?;
    let dialect = Dialect::from_backend(connection.get_database_backend(), is_cockroachdb);
    Ok(Self { connection, dialect })
  }

  pub fn from_connection(connection: DatabaseConnection, is_cockroachdb: bool) -> Self {
    let dialect = Dialect::from_backend(connection.get_database_backend(), is_cockroachdb);
    Self { connection, dialect }
  }

  pub fn dialect(&self) -> Dialect {
    self.dialect
  }

  pub fn connection(&self) -> &DatabaseConnection {
    &self.connection
  }

  pub async fn begin(&self) -> Result<StorageTransaction, MemoriError> {
    let txn = self.connection.begin().await.map_err(MemoriError::from_storage_message)?;
    Ok(StorageTransaction { txn, dialect: self.dialect })
  }

  pub async fn close(self) -> Result<(), MemoriError> {
    self.connection.close().await.map_err(MemoriError::storage)
  }
}

/// An open transaction. `flush` is a no-op: `sea_orm` issues each
/// statement eagerly, so there is nothing to buffer client-side — kept
/// as an explicit method so call sites mirror the write sequence in the
/// spec verbatim.
pub struct StorageTransaction {
  txn: DatabaseTransaction,
  dialect: Dialect,
}

impl StorageTransaction {
  pub fn connection(&self) -> &DatabaseTransaction {
    &self.txn
  }

  pub fn dialect(&self) -> Dialect {
    self.dialect
  }

  pub async fn flush(&self) -> Result<(), MemoriError> {
    Ok(())
  }

  pub async fn commit(self) -> Result<(), MemoriError> {
    self.txn.commit().await.map_err(MemoriError::from_storage_message)
  }

  pub async fn rollback(self) -> Result<(), MemoriError> {
    self.txn.rollback().await.map_err(MemoriError::from_storage_message)
  }
}
