use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use async_openai::{Client, config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs};
use memori_shared::{load_dotenv, optional_env};
use tracing::{error, warn};

pub const DEFAULT_DIMENSION: usize = 768;
pub const DEFAULT_MODEL: &str = "all-mpnet-base-v2";

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
  pub base_url: String,
  pub api_key: String,
  pub model: String,
  pub dimension: usize,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".to_string(),
      api_key: String::new(),
      model: DEFAULT_MODEL.to_string(),
      dimension: DEFAULT_DIMENSION,
    }
  }
}

impl EmbeddingConfig {
  pub fn from_env() -> Self {
    load_dotenv();
    Self {
      base_url: optional_env("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
      api_key: optional_env("OPENAI_API_KEY").unwrap_or_default(),
      model: optional_env("OPENAI_EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
      dimension: DEFAULT_DIMENSION,
    }
  }
}

fn client_cache() -> &'static RwLock<HashMap<String, Client<OpenAIConfig>>> {
  static CACHE: OnceLock<RwLock<HashMap<String, Client<OpenAIConfig>>>> = OnceLock::new();
  CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide model cache keyed by model name, the Rust analogue of the
/// original's module-level `_model_cache` dict.
fn cached_client(config: &EmbeddingConfig) -> Client<OpenAIConfig> {
  if let Some(client) = client_cache().read().expect("embedding client cache poisoned").get(&config.model) {
    return client.clone();
  }

  let openai_config = OpenAIConfig::new()
    .with_api_key(&config.api_key)
    .with_api_base(&config.base_url);
  let client = Client::with_config(openai_config);

  client_cache()
    .write()
    .expect("embedding client cache poisoned")
    .insert(config.model.clone(), client.clone());

  client
}

/// `encode(text | text[]) -> float32[D]`. Never fails: load and encode
/// failures both degrade to an all-zero vector of `dimension()` so callers
/// never have to special-case the embedding service going down.
pub struct EmbeddingService {
  config: EmbeddingConfig,
}

impl EmbeddingService {
  pub fn new(config: EmbeddingConfig) -> Self {
    Self { config }
  }

  pub fn dimension(&self) -> usize {
    self.config.dimension
  }

  fn zero_vector(&self) -> Vec<f32> {
    vec![0.0; self.config.dimension]
  }

  pub async fn encode(&self, text: &str) -> Vec<f32> {
    self
      .encode_many(std::slice::from_ref(&text.to_string()))
      .await
      .into_iter()
      .next()
      .unwrap_or_else(|| self.zero_vector())
  }

  pub async fn encode_many(&self, texts: &[String]) -> Vec<Vec<f32>> {
    if texts.is_empty() {
      return vec![];
    }

    let client = cached_client(&self.config);

    let request = match CreateEmbeddingRequestArgs::default()
      .model(&self.config.model)
      .input(texts.to_vec())
      .build()
    {
      Ok(request) => request,
      Err(err) => {
        warn!(error = %err, model = %self.config.model, "embedding model failed to load, falling back to zero vectors");
        return texts.iter().map(|_| self.zero_vector()).collect();
      }
    };

    match client.embeddings().create(request).await {
      Ok(response) => {
        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        if data.len() != texts.len() {
          error!(
            expected = texts.len(),
            got = data.len(),
            "embedding count mismatch, falling back to zero vectors"
          );
          return texts.iter().map(|_| self.zero_vector()).collect();
        }
        data.into_iter().map(|e| e.embedding).collect()
      }
      Err(err) => {
        error!(error = %err, "embedding request failed, falling back to zero vectors");
        texts.iter().map(|_| self.zero_vector()).collect()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn empty_input_short_circuits() {
    let service = EmbeddingService::new(EmbeddingConfig::default());
    assert!(service.encode_many(&[]).await.is_empty());
  }
}
