use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use na_core::logging::Logger;
use na_core::parse::{decode, FromModelOutput};
use na_core::{
    AggregatedReport, Article, ArticleAnalysis, Facts, LanguageModel, Report, Result, Sentiment,
    StepOutcome, TopicList,
};
use serde_json::Value;

use crate::prompts::{self, PARTIAL_DATA_NOTE};

/// Runs the four model calls for one article. Each step is isolated: a
/// failing call becomes [`StepOutcome::Failed`] and the next step still runs.
pub struct ArticleAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl fmt::Debug for ArticleAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleAnalyzer")
            .field("model", &self.model.name())
            .finish()
    }
}

fn prompt_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "analysis panicked".to_string()
    }
}

impl ArticleAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    async fn run_step<T: FromModelOutput>(&self, step: &str, prompt: String, logger: &Logger) -> StepOutcome<T> {
        match self.model.complete(&prompt).await {
            Ok(raw) => {
                let outcome = decode(raw);
                if let StepOutcome::Unparsed { error, .. } = &outcome {
                    logger.warn(&format!("{} returned unparseable output: {}", step, error));
                }
                outcome
            }
            Err(e) => {
                logger.error(&format!("{} failed: {}", step, e));
                StepOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Runs facts, sentiment, topics and aggregation in that order.
    ///
    /// Step failures never surface here; an `Err` means the aggregation
    /// input itself could not be built.
    pub async fn analyze(&self, article: &Article, logger: &Logger) -> Result<ArticleAnalysis> {
        let text = article.text();

        logger.info("Extracting facts from article.");
        let facts: StepOutcome<Facts> = self
            .run_step("Fact extraction", prompts::render_facts(text), logger)
            .await;

        logger.info("Analyzing sentiment.");
        let sentiment: StepOutcome<Sentiment> = self
            .run_step("Sentiment analysis", prompts::render_sentiment(text), logger)
            .await;

        logger.info("Classifying topic.");
        let topics: StepOutcome<TopicList> = self
            .run_step("Topic classification", prompts::render_topics(text), logger)
            .await;
        if let Some(list) = topics.parsed() {
            let unknown = list.unknown_labels();
            if !unknown.is_empty() {
                logger.debug(&format!("Topics outside the vocabulary: {}", unknown.join(", ")));
            }
        }

        logger.info("Aggregating results.");
        let aggregation_prompt = prompts::render_aggregation(
            &prompt_text(&facts.to_value()?),
            &prompt_text(&sentiment.to_value()?),
            &prompt_text(&topics.to_value()?),
        );
        let report: StepOutcome<AggregatedReport> = self
            .run_step("Aggregation", aggregation_prompt, logger)
            .await;

        let mut analysis = ArticleAnalysis { facts, sentiment, topics, report };
        if !analysis.is_complete() {
            if let StepOutcome::Parsed(AggregatedReport(Value::Object(map))) = &mut analysis.report {
                map.entry("note")
                    .or_insert_with(|| Value::String(PARTIAL_DATA_NOTE.to_string()));
            }
        }
        Ok(analysis)
    }

    /// [`analyze`](Self::analyze) behind a guard: an error or a panic
    /// escaping the steps turns into a failed report for this article only.
    pub async fn process(&self, article: &Article, logger: &Logger) -> Report {
        match AssertUnwindSafe(self.analyze(article, logger)).catch_unwind().await {
            Ok(Ok(analysis)) => Report::Analyzed(analysis),
            Ok(Err(e)) => {
                logger.error(&format!("Failed processing: {}", e));
                Report::Failed { error: e.to_string() }
            }
            Err(payload) => {
                let error = panic_message(payload);
                logger.error(&format!("Failed processing: {}", error));
                Report::Failed { error }
            }
        }
    }
}
