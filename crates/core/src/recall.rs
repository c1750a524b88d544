use memori_embeddings::{EmbeddingService, RawEmbedding, find_similar};
use memori_shared::{MemoriConfig, MemoriError};
use memori_storage::{StorageAdapter, StorageDriver};
use tokio::time::{Duration, sleep};
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_SECS: f64 = 0.05;

pub const CONTEXT_OPEN: &str = "<memori_context>";
pub const CONTEXT_CLOSE: &str = "</memori_context>";

/// Produces the small set of durable facts relevant to the latest user
/// turn and folds them into an outbound provider payload as a system-
/// level context addendum.
pub struct RecallEngine;

/// A recalled fact, ready to render into the `<memori_context>` block.
#[derive(Debug, Clone)]
pub struct RecalledFact {
  pub content: String,
  pub similarity: f32,
}

impl RecallEngine {
  /// Returns the facts (already filtered by threshold, ranked, and
  /// limited) relevant to `user_message` for `entity_id`, with no
  /// provider payload involved. This is also what `Memori::recall`
  /// exposes directly.
  pub async fn recall(
    adapter: &StorageAdapter,
    embeddings: &EmbeddingService,
    config: &MemoriConfig,
    entity_id: i64,
    user_message: &str,
    limit: usize,
  ) -> Result<Vec<RecalledFact>, MemoriError> {
    let mut attempt = 0;
    loop {
      match Self::recall_once(adapter, embeddings, config, entity_id, user_message, limit).await {
        Ok(facts) => return Ok(facts),
        Err(MemoriError::TransientStorage(err)) if attempt + 1 < MAX_ATTEMPTS => {
          attempt += 1;
          let backoff = BACKOFF_BASE_SECS * 2f64.powi(attempt as i32);
          warn!(attempt, backoff, error = %err, "retrying recall after transient storage error");
          sleep(Duration::from_secs_f64(backoff)).await;
        }
        Err(err) => return Err(err),
      }
    }
  }

  async fn recall_once(
    adapter: &StorageAdapter,
    embeddings: &EmbeddingService,
    config: &MemoriConfig,
    entity_id: i64,
    user_message: &str,
    limit: usize,
  ) -> Result<Vec<RecalledFact>, MemoriError> {
    let query_vector = embeddings.encode(user_message).await;

    let candidates = StorageDriver::entity_fact_get_embeddings(adapter.connection(), entity_id, config.recall_embeddings_limit)
      .await?;

    let ids: Vec<i64> = candidates.iter().map(|(id, _)| *id).collect();
    let facts = StorageDriver::entity_fact_get_facts_by_ids(adapter.connection(), &ids).await?;
    let facts_by_id: std::collections::HashMap<i64, String> = facts.into_iter().collect();

    let raw_candidates: Vec<(i64, RawEmbedding)> =
      candidates.into_iter().map(|(id, bytes)| (id, RawEmbedding::Bytes(bytes))).collect();

    let ranked = find_similar(&query_vector, &raw_candidates, limit);

    Ok(
      ranked
        .into_iter()
        .filter(|(_, similarity)| *similarity >= config.recall_relevance_threshold)
        .filter_map(|(id, similarity)| facts_by_id.get(&id).map(|content| RecalledFact { content: content.clone(), similarity }))
        .collect(),
    )
  }

  /// Render the recalled facts into the `<memori_context>` addendum, or
  /// `None` if there is nothing to say.
  pub fn render_addendum(facts: &[RecalledFact]) -> Option<String> {
    if facts.is_empty() {
      return None;
    }

    let mut body = String::new();
    body.push_str(CONTEXT_OPEN);
    body.push_str("\nOnly use the relevant context if it is relevant to the user's query.\nRelevant context about the user:\n");
    for fact in facts {
      body.push_str("- ");
      body.push_str(&fact.content);
      body.push('\n');
    }
    body.push_str(CONTEXT_CLOSE);
    Some(body)
  }
}
