use thiserror::Error;

/// The error kinds a memory pipeline can raise, per the propagation policy:
/// the request path must observe `TransientStorage`/`PermanentStorage`/
/// `Configuration`/`ProviderIntercept` failures; the augmentation path
/// swallows everything except `QuotaExceeded`.
#[derive(Debug, Error)]
pub enum MemoriError {
  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("transient storage error: {0}")]
  TransientStorage(#[source] anyhow::Error),

  #[error("storage error: {0}")]
  PermanentStorage(#[source] anyhow::Error),

  #[error("quota exceeded: {0}")]
  QuotaExceeded(String),

  #[error("augmentation error: {0}")]
  Augmentation(#[source] anyhow::Error),

  #[error("provider payload could not be parsed: {0}")]
  ProviderIntercept(String),
}

impl MemoriError {
  /// CockroachDB's serializable-conflict signal; also used by driver and
  /// recall retry loops to decide whether an error is transient.
  pub fn is_restart_transaction(msg: &str) -> bool {
    msg.contains("restart transaction")
  }

  pub fn transient(err: impl Into<anyhow::Error>) -> Self {
    Self::TransientStorage(err.into())
  }

  pub fn storage(err: impl Into<anyhow::Error>) -> Self {
    Self::PermanentStorage(err.into())
  }

  pub fn augmentation(err: impl Into<anyhow::Error>) -> Self {
    Self::Augmentation(err.into())
  }

  /// Classify a raw storage error by message, the way the writer and
  /// recall retry loops decide whether to retry.
  pub fn from_storage_message(err: impl Into<anyhow::Error>) -> Self {
    let err = err.into();
    if Self::is_restart_transaction(&err.to_string()) {
      Self::TransientStorage(err)
    } else {
      Self::PermanentStorage(err)
    }
  }
}

impl From<serde_json::Error> for MemoriError {
  fn from(err: serde_json::Error) -> Self {
    Self::storage(err)
  }
}

impl From<sea_orm::DbErr> for MemoriError {
  fn from(err: sea_orm::DbErr) -> Self {
    Self::from_storage_message(err)
  }
}

pub type MemoriResult<T> = Result<T, MemoriError>;
