//! Prompt templates for the four model calls made per article.
//!
//! Renderers only build requests; nothing here inspects what the model
//! sends back.

use na_core::TOPIC_VOCABULARY;

const FACT_HEADER: &str = "Extract key facts from this article.";
const SENTIMENT_HEADER: &str = "Analyze the overall sentiment of this article.";
const TOPIC_HEADER: &str = "Classify this article into topics from the list:";
const AGGREGATION_HEADER: &str = "Combine the following results into a single JSON report:";

pub const PARTIAL_DATA_NOTE: &str = "Partial data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Facts,
    Sentiment,
    Topics,
    Aggregation,
}

impl PromptKind {
    /// Recognizes which template produced a rendered prompt.
    pub fn of(prompt: &str) -> Option<Self> {
        let first_line = prompt.trim_start().lines().next()?;
        match first_line.trim() {
            FACT_HEADER => Some(PromptKind::Facts),
            SENTIMENT_HEADER => Some(PromptKind::Sentiment),
            TOPIC_HEADER => Some(PromptKind::Topics),
            AGGREGATION_HEADER => Some(PromptKind::Aggregation),
            _ => None,
        }
    }

    /// Article text embedded in a fact, sentiment or topic prompt.
    pub fn article_of(prompt: &str) -> Option<&str> {
        prompt
            .split_once("\nArticle:\n")
            .map(|(_, article)| article.trim_end())
    }
}

pub fn render_facts(article: &str) -> String {
    format!(
        "{FACT_HEADER}\nReturn JSON with keys:\n- who\n- what\n- when\n- where\n\nArticle:\n{article}\n"
    )
}

pub fn render_sentiment(article: &str) -> String {
    format!(
        "{SENTIMENT_HEADER}\nReturn one word: positive, neutral, or negative.\n\nArticle:\n{article}\n"
    )
}

pub fn render_topics(article: &str) -> String {
    format!(
        "{TOPIC_HEADER}\n[{}]\n\nReturn a JSON list of topics.\n\nArticle:\n{article}\n",
        TOPIC_VOCABULARY.join(", ")
    )
}

/// `facts`, `sentiment` and `topics` are the serialized step results,
/// placeholders included.
pub fn render_aggregation(facts: &str, sentiment: &str, topics: &str) -> String {
    format!(
        "{AGGREGATION_HEADER}\n\
         - Facts: {facts}\n\
         - Sentiment: {sentiment}\n\
         - Topics: {topics}\n\
         \n\
         If any field is missing, add \"note\": \"{PARTIAL_DATA_NOTE}\"\n\
         \n\
         Return only JSON.\n"
    )
}
