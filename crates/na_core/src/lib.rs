pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod parse;
pub mod summary;
pub mod types;

pub use error::{Error, Result};
pub use models::LanguageModel;
pub use summary::{BatchOutput, BatchSummary, Tally};
pub use types::{
    AggregatedReport, Article, ArticleAnalysis, Facts, Report, Sentiment, StepOutcome, StepValue,
    TopicList, ERROR_LABEL, TOPIC_VOCABULARY,
};
