use async_trait::async_trait;
use std::fmt;

use crate::Result;

#[async_trait]
pub trait LanguageModel: Send + Sync + fmt::Debug {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Send a fully rendered prompt and return the completion text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
