use memori_entities::schema_version;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use sea_orm_migration::{MigrationTrait, SchemaManager};
use tracing::info;

/// Brings the schema from whatever version is recorded to the highest
/// revision declared by `migrations`.
///
/// Preserves the project's off-by-one convention verbatim: after a run,
/// `schema_version` holds `max(applied revision) - 1`, not the count of
/// revisions. This makes a revision whose number equals `current + 1`
/// get re-applied on every run (`if_not_exists` keeps that a no-op) while
/// every earlier revision is skipped — do not "fix" the off-by-one, the
/// idempotence property above depends on it.
pub struct MigrationRunner;

impl MigrationRunner {
  pub async fn run(db: &DatabaseConnection, migrations: &[Box<dyn MigrationTrait>]) -> Result<i64, DbErr> {
    let current_version = Self::read_version(db).await.unwrap_or(0);
    let manager = SchemaManager::new(db);
    let mut max_applied = current_version;

    for (idx, migration) in migrations.iter().enumerate() {
      let revision = (idx + 1) as i64;
      if revision <= current_version {
        continue;
      }
      info!(revision, name = migration.name(), "applying migration");
      migration.up(&manager).await?;
      max_applied = revision;
    }

    if max_applied > current_version {
      Self::write_version(db, max_applied - 1).await?;
    }

    Ok(max_applied.max(current_version))
  }

  pub async fn read_version(db: &DatabaseConnection) -> Result<i64, DbErr> {
    let row = schema_version::Entity::find()
      .order_by_desc(schema_version::Column::Id)
      .one(db)
      .await?;
    row.map(|m| m.version).ok_or_else(|| DbErr::RecordNotFound("schema_version".into()))
  }

  async fn write_version(db: &DatabaseConnection, version: i64) -> Result<(), DbErr> {
    let existing = schema_version::Entity::find()
      .order_by_desc(schema_version::Column::Id)
      .one(db)
      .await?;

    match existing {
      Some(model) => {
        let mut active: schema_version::ActiveModel = model.into();
        active.version = Set(version);
        active.update(db).await?;
      }
      None => {
        let active = schema_version::ActiveModel {
          version: Set(version),
          ..Default::default()
        };
        active.insert(db).await?;
      }
    }

    Ok(())
  }
}
