use sea_orm::DatabaseBackend;
use serde::{Deserialize, Serialize};

/// The six dialects the storage abstraction recognizes. Only
/// `Sqlite`/`MySql`/`PostgreSql`/`CockroachDb` ship a driver in this
/// crate — `Oracle` and `MongoDb` exist for trait completeness so a
/// driver could be added later without reshaping the surface, but no
/// such driver exists in the dependency stack available here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
  Sqlite,
  MySql,
  PostgreSql,
  Oracle,
  CockroachDb,
  MongoDb,
}

impl Dialect {
  /// Dialects that abort a transaction on a failed statement and require
  /// an explicit `ROLLBACK` before further statements.
  pub fn requires_rollback_on_error(self) -> bool {
    matches!(self, Self::PostgreSql | Self::CockroachDb | Self::Oracle)
  }

  /// Map a `sea_orm` backend plus an explicit CockroachDB tag (the
  /// caller's responsibility, since CockroachDB speaks the Postgres wire
  /// protocol and is otherwise indistinguishable at the connection
  /// level) into a `Dialect`.
  pub fn from_backend(backend: DatabaseBackend, is_cockroachdb: bool) -> Self {
    match backend {
      DatabaseBackend::Sqlite => Self::Sqlite,
      DatabaseBackend::MySql => Self::MySql,
      DatabaseBackend::Postgres if is_cockroachdb => Self::CockroachDb,
      DatabaseBackend::Postgres => Self::PostgreSql,
      _ => unreachable!("sea_orm::DatabaseBackend has no variants beyond Sqlite/MySql/Postgres"),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sqlite => "sqlite",
      Self::MySql => "mysql",
      Self::PostgreSql => "postgresql",
      Self::Oracle => "oracle",
      Self::CockroachDb => "cockroachdb",
      Self::MongoDb => "mongodb",
    }
  }
}
