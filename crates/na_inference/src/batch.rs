use std::sync::Arc;

use na_core::logging::Logger;
use na_core::{
    Article, BatchOutput, BatchSummary, LanguageModel, Report, StepOutcome, Tally, ERROR_LABEL,
};

use crate::analyzer::ArticleAnalyzer;

pub const TOP_TOPICS: usize = 5;

/// How failed sentiment and topic steps show up in the batch summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorTally {
    /// Tally the `"error"` sentinel like any other label.
    #[default]
    Count,
    /// Leave failed steps out of the summary.
    Exclude,
}

/// Drives the analyzer over a batch, one article at a time, and builds the
/// summary. Holds no state between runs.
#[derive(Debug)]
pub struct BatchProcessor {
    analyzer: ArticleAnalyzer,
    error_tally: ErrorTally,
    logger: Logger,
}

impl BatchProcessor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            analyzer: ArticleAnalyzer::new(model),
            error_tally: ErrorTally::default(),
            logger: Logger::new(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_error_tally(mut self, error_tally: ErrorTally) -> Self {
        self.error_tally = error_tally;
        self
    }

    /// Always completes: per-step and per-article failures end up inside
    /// the reports, never as an error for the whole batch.
    pub async fn process_batch(&self, articles: &[Article]) -> BatchOutput {
        let total = articles.len();
        let mut reports = Vec::with_capacity(total);

        for (i, article) in articles.iter().enumerate() {
            self.logger.info(&format!("Processing article {}/{}", i + 1, total));
            let logger = self.logger.with_prefix(format!("[article {}/{}]", i + 1, total));
            reports.push(self.analyzer.process(article, &logger).await);
        }

        let summary = summarize(&reports, self.error_tally, &self.logger);
        self.logger.info(&format!(
            "Batch complete: {} article(s), {} failed",
            total,
            reports.iter().filter(|r| r.error().is_some()).count()
        ));
        BatchOutput { reports, summary }
    }
}

fn unparsed_warning(step: &str, article: usize, raw: &str, error: &str) -> String {
    format!(
        "Failed to parse {} for article {}: {} (answer: {:?})",
        step, article, error, raw
    )
}

/// Decodes the step outcomes of every report into sentiment and topic counts.
pub fn summarize(reports: &[Report], error_tally: ErrorTally, logger: &Logger) -> BatchSummary {
    let mut sentiments = Tally::new();
    let mut topics = Tally::new();
    let count_errors = error_tally == ErrorTally::Count;

    for (i, report) in reports.iter().enumerate() {
        let Some(analysis) = report.analysis() else {
            continue;
        };

        match &analysis.sentiment {
            StepOutcome::Parsed(sentiment) => sentiments.add(sentiment.as_str()),
            StepOutcome::Failed { .. } if count_errors => sentiments.add(ERROR_LABEL),
            StepOutcome::Failed { .. } => {}
            StepOutcome::Unparsed { raw, error } => {
                logger.warn(&unparsed_warning("sentiment", i + 1, raw, error));
            }
        }

        match &analysis.topics {
            StepOutcome::Parsed(list) => topics.extend(list.labels().iter().map(String::as_str)),
            StepOutcome::Failed { .. } if count_errors => topics.add(ERROR_LABEL),
            StepOutcome::Failed { .. } => {}
            StepOutcome::Unparsed { raw, error } => {
                logger.warn(&unparsed_warning("topics", i + 1, raw, error));
            }
        }
    }

    BatchSummary {
        sentiment_distribution: sentiments,
        most_common_topics: topics.most_common(TOP_TOPICS),
    }
}
