//! Decoding of free-text model answers into typed step results.
//!
//! Every step goes through [`decode`]: an answer that decodes becomes
//! [`StepOutcome::Parsed`], anything else is kept verbatim as
//! [`StepOutcome::Unparsed`] together with the reason it was rejected.

use serde_json::Value;

use crate::types::{AggregatedReport, Facts, Sentiment, StepOutcome, TopicList};

pub trait FromModelOutput: Sized {
    fn from_model_output(raw: &str) -> Result<Self, String>;
}

pub fn decode<T: FromModelOutput>(raw: String) -> StepOutcome<T> {
    match T::from_model_output(&raw) {
        Ok(value) => StepOutcome::Parsed(value),
        Err(error) => StepOutcome::Unparsed { raw, error },
    }
}

/// Pulls the JSON payload out of an answer that may wrap it in a Markdown
/// code fence or surround it with prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let block_start = start + 3;
        // skip the language tag on the fence line
        let json_start = trimmed[block_start..]
            .find('\n')
            .map(|n| block_start + n + 1)
            .unwrap_or(block_start);
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    let object = trimmed.find('{');
    let array = trimmed.find('[');
    let (start, close) = match (object, array) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return trimmed,
    };
    // first complete value; anything after it is prose
    let mut values = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
    if let Some(Ok(_)) = values.next() {
        return &trimmed[start..start + values.byte_offset()];
    }
    match trimmed.rfind(close) {
        Some(end) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(extract_json(raw)).map_err(|e| e.to_string())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items.iter().map(value_to_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

impl FromModelOutput for Facts {
    fn from_model_output(raw: &str) -> Result<Self, String> {
        let value = parse_json(raw)?;
        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object with who/what/when/where".to_string())?;

        let field = |key: &str| {
            object
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
                .map(|(_, v)| value_to_text(v))
                .unwrap_or_default()
        };

        Ok(Facts {
            who: field("who"),
            what: field("what"),
            when: field("when"),
            location: field("where"),
        })
    }
}

impl FromModelOutput for Sentiment {
    fn from_model_output(raw: &str) -> Result<Self, String> {
        let lowered = raw.trim().to_lowercase();
        let label = lowered
            .strip_prefix("sentiment:")
            .unwrap_or(&lowered)
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '.' | '!' | '*' | '`'));
        label.parse()
    }
}

impl FromModelOutput for TopicList {
    fn from_model_output(raw: &str) -> Result<Self, String> {
        let value = parse_json(raw)?;
        let items = match &value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("topics") {
                Some(Value::Array(items)) => items,
                _ => return Err("expected a JSON list of topics".to_string()),
            },
            _ => return Err("expected a JSON list of topics".to_string()),
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(label) => Ok(label.trim().to_lowercase()),
                other => Err(format!("topic entries must be strings, got {}", other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TopicList)
    }
}

impl FromModelOutput for AggregatedReport {
    fn from_model_output(raw: &str) -> Result<Self, String> {
        parse_json(raw).map(AggregatedReport)
    }
}
