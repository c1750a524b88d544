use memori_shared::{MemoriError, optional_env};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};
use tracing::warn;

const MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_URL: &str = "https://api.memori.dev";
const PROVIDER_HEADER: &str = "x-memori-sdk";
const PROVIDER_HEADER_VALUE: &str = "memori-rust";
const TOTAL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationMessage {
  pub role: String,
  pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationRequest {
  pub conversation: AugmentationRequestConversation,
  pub meta: AugmentationRequestMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationRequestConversation {
  pub messages: Vec<AugmentationMessage>,
  pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationRequestMeta {
  pub llm: AugmentationLlmMeta,
  pub sdk: AugmentationSdkMeta,
  pub storage: AugmentationStorageMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationLlmMeta {
  pub model: AugmentationLlmModelMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationLlmModelMeta {
  pub provider: String,
  pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationSdkMeta {
  pub lang: &'static str,
  pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AugmentationStorageMeta {
  pub dialect: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AugmentationResponse {
  #[serde(default)]
  pub entity: Option<AugmentationEntityResponse>,
  #[serde(default)]
  pub process: Option<AugmentationProcessResponse>,
  #[serde(default)]
  pub conversation: Option<AugmentationConversationResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AugmentationEntityResponse {
  #[serde(default)]
  pub facts: Vec<String>,
  #[serde(default)]
  pub triples: Vec<Triple>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AugmentationProcessResponse {
  #[serde(default)]
  pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AugmentationConversationResponse {
  pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Triple {
  pub subject: TripleNode,
  pub predicate: String,
  pub object: TripleNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripleNode {
  pub name: String,
  #[serde(default)]
  pub r#type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: Option<String>,
}

impl Triple {
  pub fn as_fact(&self) -> String {
    format!("{} {} {}", self.subject.name, self.predicate, self.object.name)
  }
}

/// Calls the external derive-memories endpoint with bounded retries.
/// Anonymous callers (`MEMORI_API_KEY` unset) who get HTTP 429 back raise
/// `QuotaExceeded`; authenticated callers who get 429 are silently
/// skipped (an empty response), since that shape is a rate limit, not an
/// account-level block.
pub struct RemoteAugmentationClient {
  client: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
  test_mode: bool,
}

impl RemoteAugmentationClient {
  pub fn from_env() -> Self {
    let base_url = optional_env("MEMORI_API_URL_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let api_key = optional_env("MEMORI_API_KEY");
    let test_mode = optional_env("MEMORI_TEST_MODE").is_some();
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
      .build()
      .expect("reqwest client with a fixed timeout always builds");

    Self { client, base_url, api_key, test_mode }
  }

  fn is_authenticated(&self) -> bool {
    self.api_key.is_some()
  }

  pub async fn augment(&self, request: &AugmentationRequest) -> Result<AugmentationResponse, MemoriError> {
    if self.test_mode {
      let body = serde_json::to_string_pretty(request).unwrap_or_default();
      println!("[MEMORI_TEST_MODE] augmentation request suppressed:\n{body}");
      return Ok(AugmentationResponse::default());
    }

    let url = format!("{}/v1/sdk/augmentation", self.base_url.trim_end_matches('/'));
    let bearer = self.api_key.clone().unwrap_or_else(|| "anonymous".to_string());

    for attempt in 0..MAX_ATTEMPTS {
      let response = self
        .client
        .post(&url)
        .bearer_auth(&bearer)
        .header(PROVIDER_HEADER, PROVIDER_HEADER_VALUE)
        .json(request)
        .send()
        .await;

      match response {
        Ok(response) => {
          let status = response.status();

          if status.as_u16() == 429 {
            if self.is_authenticated() {
              return Ok(AugmentationResponse::default());
            }
            let message = response
              .json::<ErrorBody>()
              .await
              .ok()
              .and_then(|body| body.message)
              .unwrap_or_else(|| "quota exceeded".to_string());
            return Err(MemoriError::QuotaExceeded(message));
          }

          if status.is_success() {
            return response.json::<AugmentationResponse>().await.map_err(MemoriError::augmentation);
          }

          if status.is_server_error() && attempt + 1 < MAX_ATTEMPTS {
            warn!(attempt, %status, "augmentation request failed with a server error, retrying");
            sleep(Duration::from_secs(2u64.pow(attempt))).await;
            continue;
          }

          return Err(MemoriError::augmentation(anyhow::anyhow!("augmentation request failed with status {status}")));
        }
        Err(err) if attempt + 1 < MAX_ATTEMPTS => {
          warn!(attempt, error = %err, "augmentation request transport error, retrying");
          sleep(Duration::from_secs(2u64.pow(attempt))).await;
        }
        Err(err) => return Err(MemoriError::augmentation(err)),
      }
    }

    Err(MemoriError::augmentation(anyhow::anyhow!("augmentation request exhausted all retries")))
  }
}
