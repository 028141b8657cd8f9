use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use na_core::{LanguageModel, Result};

use crate::ModelConfig;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    OpenAi,
    Dummy,
}

impl FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ModelBackend::OpenAi),
            "dummy" => Ok(ModelBackend::Dummy),
            other => Err(format!(
                "Unknown model backend: {}. Available backends: openai, dummy",
                other
            )),
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelBackend::OpenAi => f.write_str("openai"),
            ModelBackend::Dummy => f.write_str("dummy"),
        }
    }
}

pub fn create_model(backend: ModelBackend, config: ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    let model: Arc<dyn LanguageModel> = match backend {
        ModelBackend::OpenAi => Arc::new(OpenAiModel::new(config)?),
        ModelBackend::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::info!("🧠 Inference model initialized (using {})", model.name());
    Ok(model)
}
