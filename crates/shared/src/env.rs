use std::env;

use crate::error::MemoriError;

/// Load a `.env` file if present; safe to call repeatedly.
pub fn load_dotenv() {
  dotenvy::dotenv().ok();
}

pub fn required_env(key: &str) -> Result<String, MemoriError> {
  env::var(key).map_err(|_| MemoriError::Configuration(format!("env {key} must be set")))
}

pub fn optional_env(key: &str) -> Option<String> {
  env::var(key).ok()
}
