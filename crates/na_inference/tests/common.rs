// Scripted model shared by the integration tests.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use na_core::{Error, LanguageModel, Result};
use na_inference::models::DummyModel;
use na_inference::prompts::PromptKind;

/// Wraps [`DummyModel`] and lets a test force failures, fixed answers or
/// panics for chosen prompt kinds. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    inner: DummyModel,
    failures: Vec<(PromptKind, Option<String>)>,
    answers: Vec<(PromptKind, String)>,
    panic_on: Option<String>,
    calls: Mutex<Vec<(PromptKind, String)>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `kind`.
    pub fn failing(mut self, kind: PromptKind) -> Self {
        self.failures.push((kind, None));
        self
    }

    /// Fail calls of `kind` whose article contains `needle`.
    pub fn failing_for(mut self, kind: PromptKind, needle: &str) -> Self {
        self.failures.push((kind, Some(needle.to_string())));
        self
    }

    pub fn answering(mut self, kind: PromptKind, answer: &str) -> Self {
        self.answers.push((kind, answer.to_string()));
        self
    }

    pub fn panicking_on(mut self, needle: &str) -> Self {
        self.panic_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PromptKind> {
        self.calls.lock().unwrap().iter().map(|(kind, _)| *kind).collect()
    }

    /// Prompts received for `kind`, in call order.
    pub fn prompts_of(&self, kind: PromptKind) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let kind = PromptKind::of(prompt);
        let article = PromptKind::article_of(prompt).unwrap_or(prompt);
        if let Some(kind) = kind {
            self.calls.lock().unwrap().push((kind, prompt.to_string()));
        }

        if let Some(needle) = &self.panic_on {
            if article.contains(needle.as_str()) {
                panic!("scripted panic on {}", needle);
            }
        }

        for (failing, needle) in &self.failures {
            let matches_article = needle.as_deref().map_or(true, |n| article.contains(n));
            if Some(*failing) == kind && matches_article {
                return Err(Error::ModelInvocation {
                    attempts: 1,
                    message: "scripted failure".to_string(),
                });
            }
        }

        if let Some((_, answer)) = self.answers.iter().find(|(k, _)| Some(*k) == kind) {
            return Ok(answer.clone());
        }

        self.inner.complete(prompt).await
    }
}
