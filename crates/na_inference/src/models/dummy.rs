use std::fmt;

use async_trait::async_trait;
use na_core::{LanguageModel, Result};
use serde_json::{json, Map, Value};

use crate::prompts::{PromptKind, PARTIAL_DATA_NOTE};

const POSITIVE_WORDS: &[&str] = &[
    "triumph", "triumphed", "win", "won", "wins", "success", "successful", "growth", "support",
    "supporting", "passed", "improve", "improved", "enhanced", "record", "celebrate", "celebrated",
    "breakthrough", "boost", "gains",
];

const NEGATIVE_WORDS: &[&str] = &[
    "loss", "lost", "crash", "decline", "crisis", "death", "killed", "fail", "failed", "scandal",
    "war", "protest", "cut", "cuts", "fell", "injured", "fraud", "layoffs", "disaster",
];

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("politics", &["senate", "bill", "election", "government", "minister", "parliament", "congress", "president", "policy", "vote", "law"]),
    ("technology", &["iphone", "ai", "software", "apple", "smartphone", "technology", "tech", "app", "chip", "computer", "internet", "robot"]),
    ("sports", &["football", "team", "championship", "match", "league", "tournament", "goal", "coach", "olympic", "rivals"]),
    ("business", &["investment", "market", "stock", "company", "economy", "profit", "revenue", "shares", "bank", "trade"]),
    ("health", &["health", "hospital", "vaccine", "disease", "doctor", "medical", "virus", "patients"]),
    ("entertainment", &["film", "movie", "music", "celebrity", "album", "concert", "actor", "festival", "series", "award"]),
];

const TIME_WORDS: &[&str] = &[
    "today", "yesterday", "tomorrow", "tonight", "monday", "tuesday", "wednesday", "thursday",
    "friday", "saturday", "sunday",
];

const LINKING_VERBS: &[&str] = &["was", "were", "is", "are", "has", "have", "will"];

/// Offline backend answering each prompt kind from keyword heuristics.
/// Deterministic, so the same article always gets the same analysis.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn first_sentence(text: &str) -> &str {
    let text = text.trim();
    match text.find(|c: char| c == '.' || c == '!' || c == '?') {
        Some(end) => &text[..end],
        None => text,
    }
}

fn extract_facts(article: &str) -> Value {
    let sentence = first_sentence(article);
    let tokens: Vec<&str> = sentence.split_whitespace().collect();

    let verb_at = tokens.iter().position(|t| {
        let lower = t.to_lowercase();
        (lower.ends_with("ed") && lower.len() > 3) || LINKING_VERBS.contains(&lower.as_str())
    });
    let (who, what) = match verb_at {
        Some(i) if i > 0 => (tokens[..i].join(" "), tokens[i..].join(" ")),
        _ => (String::new(), sentence.to_string()),
    };

    let lowered = words(article);
    let when = lowered
        .iter()
        .find(|w| {
            TIME_WORDS.contains(&w.as_str())
                || (w.len() == 4 && w.starts_with(['1', '2']) && w.chars().all(|c| c.is_ascii_digit()))
        })
        .cloned()
        .unwrap_or_default();

    let all_tokens: Vec<&str> = article.split_whitespace().collect();
    let location = all_tokens
        .windows(2)
        .find(|pair| pair[0] == "in" && pair[1].starts_with(|c: char| c.is_uppercase()))
        .map(|pair| pair[1].trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .unwrap_or_default();

    json!({ "who": who, "what": what.trim_end_matches(',').to_string(), "when": when, "where": location })
}

fn classify_sentiment(article: &str) -> &'static str {
    let tokens = words(article);
    let positive = tokens.iter().filter(|w| POSITIVE_WORDS.contains(&w.as_str())).count();
    let negative = tokens.iter().filter(|w| NEGATIVE_WORDS.contains(&w.as_str())).count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => "positive",
        std::cmp::Ordering::Less => "negative",
        std::cmp::Ordering::Equal => "neutral",
    }
}

fn classify_topics(article: &str) -> Vec<&'static str> {
    let tokens = words(article);
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| tokens.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(topic, _)| *topic)
        .collect()
}

fn aggregate(prompt: &str) -> Value {
    let field = |label: &str| -> Value {
        let marker = format!("- {}: ", label);
        prompt
            .lines()
            .find_map(|line| line.strip_prefix(marker.as_str()))
            .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
            .unwrap_or(Value::Null)
    };

    let facts = field("Facts");
    let sentiment = field("Sentiment");
    let topics = field("Topics");

    let degraded = |value: &Value| match value {
        Value::Null => true,
        Value::String(s) => s == "error",
        Value::Array(items) => items.iter().any(|t| t == "error"),
        Value::Object(map) => map.contains_key("error") || map.contains_key("parse_error"),
        _ => false,
    };
    let partial = [&facts, &sentiment, &topics].into_iter().any(degraded);

    let mut report = Map::new();
    report.insert("facts".to_string(), facts);
    report.insert("sentiment".to_string(), sentiment);
    report.insert("topics".to_string(), topics);
    if partial {
        report.insert("note".to_string(), Value::String(PARTIAL_DATA_NOTE.to_string()));
    }
    Value::Object(report)
}

#[async_trait]
impl LanguageModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let article = PromptKind::article_of(prompt).unwrap_or(prompt);
        let answer = match PromptKind::of(prompt) {
            Some(PromptKind::Facts) => extract_facts(article).to_string(),
            Some(PromptKind::Sentiment) => classify_sentiment(article).to_string(),
            Some(PromptKind::Topics) => json!(classify_topics(article)).to_string(),
            Some(PromptKind::Aggregation) => aggregate(prompt).to_string(),
            None => prompt.split_whitespace().take(20).collect::<Vec<_>>().join(" "),
        };
        Ok(answer)
    }
}
