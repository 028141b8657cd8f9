use std::time::Duration;

use na_core::{Error, Result};
use url::Url;

pub mod analyzer;
pub mod batch;
pub mod models;
pub mod prompts;
pub mod retry;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
    pub max_retries: u32,
    pub api_key: Option<String>,
    pub base_url: String,
    pub retry_base_delay: Duration,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_retries: 3,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_base_delay: retry::RetryConfig::default().base_delay,
        }
    }
}

impl ModelConfig {
    /// Chat completion endpoint under the configured base URL.
    pub fn completions_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", self.base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("chat/completions")
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", self.base_url, e)))
    }

    pub fn retry_config(&self) -> retry::RetryConfig {
        retry::RetryConfig {
            max_retries: self.max_retries,
            base_delay: self.retry_base_delay,
        }
    }
}

pub mod prelude {
    pub use super::analyzer::ArticleAnalyzer;
    pub use super::batch::{BatchProcessor, ErrorTally};
    pub use super::models::{create_model, ModelBackend};
    pub use super::ModelConfig;
    pub use na_core::{Article, BatchOutput, Error, LanguageModel, Report, Result};
}

pub use models::create_model;
