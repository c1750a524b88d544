use std::sync::Arc;

use memori::{Memori, MemoriConfig};
use memori_embeddings::{EmbeddingConfig, EmbeddingService};
use memori_migration::MigrationRunner;
use memori_storage::StorageAdapter;
use memori_worker::{AdvancedAugmentation, AugmentationWorkerPool, BatchedWriter, RemoteAugmentationClient, connect_fn};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Stands up an in-memory handle, registers the one shipped augmentation,
/// and drives a couple of exchanges end to end. Meant to be read, not
/// deployed — a real application supplies its own `DATABASE_URL` and
/// provider client instead of the fake `call` closure below.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
  memori_shared::load_dotenv();
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let database_url = memori_shared::optional_env("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string());
  let storage = StorageAdapter::connect(&database_url, false).await?;
  MigrationRunner::run(storage.connection(), &memori_migration::revisions()).await?;

  let config = MemoriConfig::from_env();

  let connect = connect_fn({
    let database_url = database_url.clone();
    move || {
      let database_url = database_url.clone();
      async move { StorageAdapter::connect(&database_url, false).await }
    }
  });

  let writer = Arc::new(BatchedWriter::spawn(connect.clone(), config.clone()));

  let embeddings = EmbeddingService::new(EmbeddingConfig::from_env());
  let augmentation = AdvancedAugmentation::new(RemoteAugmentationClient::from_env(), embeddings);
  let pool = Arc::new(AugmentationWorkerPool::new(connect, writer, &config, vec![Box::new(augmentation)]));

  let memori = Memori::open(storage, config).await?.with_sink(pool);
  memori.attribution(Some("user-123"), None).await?;

  let response = memori
    .invoke("openai", json!({ "messages": [{ "role": "user", "content": "hello, remember that I like tea" }] }), |sent| async move {
      tracing::info!(payload = %sent, "would call the provider here");
      Ok(json!({ "choices": [{ "message": { "role": "assistant", "content": "noted" } }] }))
    })
    .await?;

  println!("{response}");

  let recalled = memori.recall("what do I like", 5).await?;
  println!("recalled {} fact(s)", recalled.len());

  Ok(())
}
