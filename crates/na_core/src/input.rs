use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::types::Article;
use crate::{Error, Result};

/// Column (or object field) holding the article text.
pub const ARTICLE_COLUMN: &str = "Article";

/// Reads the `Article` column of a CSV document with a header row.
pub fn articles_from_csv<R: Read>(reader: R) -> Result<Vec<Article>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == ARTICLE_COLUMN)
        .ok_or_else(|| Error::MissingColumn(ARTICLE_COLUMN.to_string()))?;

    reader
        .records()
        .map(|record| {
            let record = record?;
            Ok(Article::from(record.get(column).unwrap_or_default()))
        })
        .collect()
}

/// Accepts a JSON array of strings, or of objects carrying an `Article` field.
pub fn articles_from_json(text: &str) -> Result<Vec<Article>> {
    let value: Value = serde_json::from_str(text)?;
    let items = value
        .as_array()
        .ok_or_else(|| Error::Input("expected a JSON array of articles".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(text) => Ok(Article::from(text.as_str())),
            Value::Object(map) => match map.get(ARTICLE_COLUMN) {
                Some(Value::String(text)) => Ok(Article::from(text.as_str())),
                _ => Err(Error::Input(format!(
                    "entry {} has no string '{}' field",
                    i + 1,
                    ARTICLE_COLUMN
                ))),
            },
            _ => Err(Error::Input(format!("entry {} is neither a string nor an object", i + 1))),
        })
        .collect()
}

/// Loads articles from a `.csv` or `.json` file.
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => articles_from_csv(File::open(path)?),
        Some("json") => articles_from_json(&std::fs::read_to_string(path)?),
        _ => Err(Error::Input(format!(
            "unsupported input file {}: expected .csv or .json",
            path.display()
        ))),
    }
}

/// Built-in sample batch used when no input is given.
pub fn demo_articles() -> Vec<Article> {
    vec![
        Article::from("Apple released its latest iPhone 16 today, featuring AI-enhanced capabilities and a titanium frame."),
        Article::from("The local football team triumphed 3-1 over their rivals in the regional championship."),
        Article::from("A bill supporting green energy investment was passed by the senate yesterday in Washington."),
    ]
}
