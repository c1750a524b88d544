pub use sea_orm_migration::prelude::*;

mod m20260301_01_create_schema_version_table;
mod m20260301_02_create_entity_table;
mod m20260301_03_create_process_table;
mod m20260301_04_create_session_table;
mod m20260301_05_create_conversation_table;
mod m20260301_06_create_conversation_message_table;
mod m20260301_07_create_entity_fact_table;
mod m20260301_08_create_subject_table;
mod m20260301_09_create_predicate_table;
mod m20260301_10_create_object_table;
mod m20260301_11_create_knowledge_graph_table;
mod m20260301_12_create_process_attribute_table;

mod runner;
pub use runner::MigrationRunner;

/// Ordered revisions, leaves first. `MigrationRunner` applies these
/// against the manually-tracked `schema_version` row rather than
/// `sea_orm_migration`'s own bookkeeping table.
pub fn revisions() -> Vec<Box<dyn MigrationTrait>> {
  vec![
    Box::new(m20260301_01_create_schema_version_table::Migration),
    Box::new(m20260301_02_create_entity_table::Migration),
    Box::new(m20260301_03_create_process_table::Migration),
    Box::new(m20260301_04_create_session_table::Migration),
    Box::new(m20260301_05_create_conversation_table::Migration),
    Box::new(m20260301_06_create_conversation_message_table::Migration),
    Box::new(m20260301_07_create_entity_fact_table::Migration),
    Box::new(m20260301_08_create_subject_table::Migration),
    Box::new(m20260301_09_create_predicate_table::Migration),
    Box::new(m20260301_10_create_object_table::Migration),
    Box::new(m20260301_11_create_knowledge_graph_table::Migration),
    Box::new(m20260301_12_create_process_attribute_table::Migration),
  ]
}

#[cfg(test)]
mod tests {
  use sea_orm::Database;

  use super::*;

  #[tokio::test]
  async fn migrates_and_converges() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let migrations = revisions();

    let applied = MigrationRunner::run(&db, &migrations).await.unwrap();
    assert_eq!(applied, migrations.len() as i64);

    let version = MigrationRunner::read_version(&db).await.unwrap();
    assert_eq!(version, migrations.len() as i64 - 1);

    // Re-running is idempotent: the stored version is unchanged.
    MigrationRunner::run(&db, &migrations).await.unwrap();
    let version_after_rerun = MigrationRunner::read_version(&db).await.unwrap();
    assert_eq!(version_after_rerun, version);
  }
}
