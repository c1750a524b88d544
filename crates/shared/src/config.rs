use crate::env::optional_env;

/// Flat configuration shared by the cache/writer, recall engine, and
/// augmentation worker pool. Built with `Default`, not a fluent builder —
/// callers set the fields they care about directly.
#[derive(Debug, Clone)]
pub struct MemoriConfig {
  pub session_timeout_minutes: i64,
  pub recall_facts_limit: usize,
  pub recall_embeddings_limit: u64,
  pub recall_relevance_threshold: f32,
  pub request_backoff_factor: u32,
  pub request_num_backoff: u32,
  pub request_secs_timeout: u64,
  pub augmentation_worker_count: usize,
  pub batched_writer_queue_size: usize,
  pub batch_size: usize,
  pub batch_timeout_secs: f64,
}

impl Default for MemoriConfig {
  fn default() -> Self {
    Self {
      session_timeout_minutes: 30,
      recall_facts_limit: 5,
      recall_embeddings_limit: 1000,
      recall_relevance_threshold: 0.1,
      request_backoff_factor: 1,
      request_num_backoff: 5,
      request_secs_timeout: 5,
      augmentation_worker_count: 50,
      batched_writer_queue_size: 1000,
      batch_size: 100,
      batch_timeout_secs: 0.1,
    }
  }
}

impl MemoriConfig {
  /// Overlays process-environment overrides onto the defaults. Only
  /// `session_timeout_minutes` is commonly tuned this way in practice;
  /// everything else keeps its spec'd default unless the caller sets the
  /// field directly.
  pub fn from_env() -> Self {
    let mut config = Self::default();
    if let Some(minutes) = optional_env("MEMORI_SESSION_TIMEOUT_MINUTES").and_then(|v| v.parse().ok()) {
      config.session_timeout_minutes = minutes;
    }
    config
  }
}
