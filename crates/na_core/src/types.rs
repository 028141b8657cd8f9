use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Fixed label set the topic classifier draws from.
pub const TOPIC_VOCABULARY: [&str; 6] = [
    "politics",
    "technology",
    "sports",
    "business",
    "health",
    "entertainment",
];

/// Label used for failed sentiment and topic steps.
pub const ERROR_LABEL: &str = "error";

/// One unit of input text. No structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article(pub String);

impl Article {
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl From<String> for Article {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Article {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    pub who: String,
    pub what: String,
    pub when: String,
    #[serde(rename = "where")]
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment label: {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicList(pub Vec<String>);

impl TopicList {
    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Labels that are not part of [`TOPIC_VOCABULARY`].
    pub fn unknown_labels(&self) -> Vec<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|label| !TOPIC_VOCABULARY.contains(label))
            .collect()
    }
}

/// The model's own combination of facts, sentiment and topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedReport(pub Value);

/// A value produced by one analysis step, with the placeholder written out
/// in its place when the model call fails.
pub trait StepValue: Serialize {
    fn failure_placeholder(reason: &str) -> Value;
}

impl StepValue for Facts {
    fn failure_placeholder(reason: &str) -> Value {
        json!({ "error": "Fact extraction failed", "note": reason })
    }
}

impl StepValue for Sentiment {
    fn failure_placeholder(_reason: &str) -> Value {
        json!(ERROR_LABEL)
    }
}

impl StepValue for TopicList {
    fn failure_placeholder(_reason: &str) -> Value {
        json!([ERROR_LABEL])
    }
}

impl StepValue for AggregatedReport {
    fn failure_placeholder(reason: &str) -> Value {
        json!({ "error": "Aggregation failed", "note": reason })
    }
}

/// Tagged result of one step: the model answered and the answer decoded,
/// the model answered with something undecodable, or the call failed.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Parsed(T),
    Unparsed { raw: String, error: String },
    Failed { reason: String },
}

impl<T> StepOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, StepOutcome::Parsed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn parsed(&self) -> Option<&T> {
        match self {
            StepOutcome::Parsed(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: StepValue> StepOutcome<T> {
    /// Renders the outcome the way it appears in the output document and in
    /// the aggregation prompt.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            StepOutcome::Parsed(value) => serde_json::to_value(value),
            StepOutcome::Unparsed { raw, error } => Ok(json!({ "raw": raw, "parse_error": error })),
            StepOutcome::Failed { reason } => Ok(T::failure_placeholder(reason)),
        }
    }
}

impl<T: StepValue> Serialize for StepOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleAnalysis {
    pub facts: StepOutcome<Facts>,
    pub sentiment: StepOutcome<Sentiment>,
    pub topics: StepOutcome<TopicList>,
    pub report: StepOutcome<AggregatedReport>,
}

impl ArticleAnalysis {
    /// True when fact, sentiment and topic steps all decoded.
    pub fn is_complete(&self) -> bool {
        self.facts.is_parsed() && self.sentiment.is_parsed() && self.topics.is_parsed()
    }
}

/// Per-article output. A failed article carries only a null report and the
/// error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Analyzed(ArticleAnalysis),
    Failed { error: String },
}

impl Report {
    pub fn analysis(&self) -> Option<&ArticleAnalysis> {
        match self {
            Report::Analyzed(analysis) => Some(analysis),
            Report::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Report::Analyzed(_) => None,
            Report::Failed { error } => Some(error),
        }
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Report::Analyzed(analysis) => analysis.serialize(serializer),
            Report::Failed { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("report", &Value::Null)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
