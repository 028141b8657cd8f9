mod common;

use std::sync::Arc;

use common::ScriptedModel;
use na_core::input::demo_articles;
use na_core::{Article, Report, Sentiment, StepOutcome};
use na_inference::prelude::*;
use na_inference::prompts::{PromptKind, PARTIAL_DATA_NOTE};
use serde_json::json;

const IPHONE: &str = "Apple released its latest iPhone 16 today, featuring AI-enhanced capabilities and a titanium frame.";

fn processor(model: ScriptedModel) -> (Arc<ScriptedModel>, BatchProcessor) {
    let model = Arc::new(model);
    let processor = BatchProcessor::new(model.clone());
    (model, processor)
}

#[tokio::test]
async fn test_single_article_end_to_end() {
    let (_, processor) = processor(ScriptedModel::new());
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    assert_eq!(output.reports.len(), 1);
    let analysis = output.reports[0].analysis().unwrap();
    assert!(analysis.is_complete());
    assert_eq!(analysis.topics.parsed().unwrap().labels(), ["technology"]);

    assert_eq!(output.summary.sentiment_distribution.total(), 1);
    assert_eq!(output.summary.most_common_topics, vec![("technology".to_string(), 1)]);

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["reports"][0]["facts"]["who"], "Apple");
    assert!(value["reports"][0]["report"].is_object());
}

#[tokio::test]
async fn test_model_calls_run_in_order() {
    let (model, processor) = processor(ScriptedModel::new());
    processor.process_batch(&[Article::from(IPHONE)]).await;

    assert_eq!(
        model.calls(),
        vec![
            PromptKind::Facts,
            PromptKind::Sentiment,
            PromptKind::Topics,
            PromptKind::Aggregation,
        ]
    );
}

#[tokio::test]
async fn test_topic_failure_is_isolated_to_one_article() {
    let (_, processor) = processor(ScriptedModel::new().failing_for(PromptKind::Topics, "football"));
    let output = processor.process_batch(&demo_articles()).await;

    assert_eq!(output.reports.len(), 3);
    let failed = output.reports[1].analysis().unwrap();
    assert!(failed.topics.is_failed());
    assert!(failed.sentiment.is_parsed());
    assert!(failed.report.is_parsed());

    let value = serde_json::to_value(&output.reports[1]).unwrap();
    assert_eq!(value["topics"], json!(["error"]));

    assert_eq!(
        output.summary.most_common_topics,
        vec![
            ("technology".to_string(), 1),
            ("error".to_string(), 1),
            ("politics".to_string(), 1),
            ("business".to_string(), 1),
        ]
    );
    assert_eq!(output.summary.sentiment_distribution.get("positive"), 3);
}

#[tokio::test]
async fn test_excluding_errors_from_summary() {
    let (_, processor) = processor(ScriptedModel::new().failing_for(PromptKind::Topics, "football"));
    let processor = processor.with_error_tally(ErrorTally::Exclude);
    let output = processor.process_batch(&demo_articles()).await;

    assert!(output.summary.most_common_topics.iter().all(|(label, _)| label != "error"));
    assert_eq!(output.summary.most_common_topics.len(), 3);
}

#[tokio::test]
async fn test_empty_batch() {
    let (model, processor) = processor(ScriptedModel::new());
    let output = processor.process_batch(&[]).await;

    assert!(model.calls().is_empty());
    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "reports": [],
            "summary": { "sentiment_distribution": {}, "most_common_topics": [] }
        })
    );
}

#[tokio::test]
async fn test_failed_steps_use_placeholders() {
    let model = ScriptedModel::new()
        .failing(PromptKind::Facts)
        .failing(PromptKind::Sentiment)
        .failing(PromptKind::Aggregation);
    let (_, processor) = processor(model);
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert_eq!(value["facts"]["error"], "Fact extraction failed");
    assert_eq!(value["sentiment"], "error");
    assert_eq!(value["topics"], json!(["technology"]));
    assert_eq!(value["report"]["error"], "Aggregation failed");
    assert_eq!(output.summary.sentiment_distribution.get("error"), 1);
}

#[tokio::test]
async fn test_panicking_article_becomes_failed_report() {
    let (model, processor) = processor(ScriptedModel::new().panicking_on("football"));
    let output = processor.process_batch(&demo_articles()).await;

    assert_eq!(output.reports.len(), 3);
    assert!(output.reports[0].analysis().is_some());
    assert!(matches!(&output.reports[1], Report::Failed { error } if error.contains("scripted panic")));
    assert!(output.reports[2].analysis().is_some());

    let value = serde_json::to_value(&output.reports[1]).unwrap();
    assert!(value["report"].is_null());

    // The failed article contributes to neither tally.
    assert_eq!(output.summary.sentiment_distribution.total(), 2);
    // Four calls for each healthy article plus the one that panicked.
    assert_eq!(model.calls().len(), 9);
}

#[tokio::test]
async fn test_unparseable_topics_are_skipped() {
    let (_, processor) = processor(ScriptedModel::new().answering(PromptKind::Topics, "not a list at all"));
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    let analysis = output.reports[0].analysis().unwrap();
    assert!(matches!(&analysis.topics, StepOutcome::Unparsed { raw, .. } if raw == "not a list at all"));
    assert!(output.summary.most_common_topics.is_empty());
    assert_eq!(output.summary.sentiment_distribution.total(), 1);

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert_eq!(value["topics"]["raw"], "not a list at all");
}

#[tokio::test]
async fn test_partial_note_added_to_aggregated_report() {
    let model = ScriptedModel::new()
        .failing(PromptKind::Sentiment)
        .answering(PromptKind::Aggregation, r#"{"summary": "iPhone launch"}"#);
    let (_, processor) = processor(model);
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert_eq!(value["report"]["summary"], "iPhone launch");
    assert_eq!(value["report"]["note"], PARTIAL_DATA_NOTE);
}

#[tokio::test]
async fn test_complete_analysis_has_no_partial_note() {
    let model = ScriptedModel::new().answering(PromptKind::Aggregation, r#"{"summary": "iPhone launch"}"#);
    let (_, processor) = processor(model);
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert!(value["report"].get("note").is_none());
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let (_, processor) = processor(ScriptedModel::new());
    let first = processor.process_batch(&demo_articles()).await;
    let second = processor.process_batch(&demo_articles()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_summary_counts_match_reports() {
    let (_, processor) = processor(ScriptedModel::new());
    let output = processor.process_batch(&demo_articles()).await;

    let analyzed = output.reports.iter().filter(|r| r.analysis().is_some()).count();
    assert_eq!(output.summary.sentiment_distribution.total(), analyzed);
    assert!(output.summary.most_common_topics.len() <= 5);
    for report in &output.reports {
        let sentiment = &report.analysis().unwrap().sentiment;
        assert!(matches!(
            sentiment,
            StepOutcome::Parsed(Sentiment::Positive | Sentiment::Neutral | Sentiment::Negative)
        ));
    }
}

#[tokio::test]
async fn test_unparseable_sentiment_is_skipped() {
    let (_, processor) = processor(ScriptedModel::new().answering(PromptKind::Sentiment, "mixed"));
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    assert_eq!(output.summary.sentiment_distribution.total(), 0);
    assert_eq!(output.summary.most_common_topics, vec![("technology".to_string(), 1)]);

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert_eq!(value["sentiment"]["raw"], "mixed");
    assert!(value["sentiment"]["parse_error"].is_string());
}

#[tokio::test]
async fn test_unparseable_facts_feed_aggregation() {
    let model = ScriptedModel::new()
        .answering(PromptKind::Facts, "Apple launched a phone.")
        .answering(PromptKind::Aggregation, r#"{"summary": "iPhone launch"}"#);
    let (model, processor) = processor(model);
    let output = processor.process_batch(&[Article::from(IPHONE)]).await;

    let analysis = output.reports[0].analysis().unwrap();
    assert!(matches!(&analysis.facts, StepOutcome::Unparsed { .. }));
    assert!(analysis.sentiment.is_parsed());

    let aggregation = model.prompts_of(PromptKind::Aggregation);
    assert_eq!(aggregation.len(), 1);
    assert!(aggregation[0].contains(r#"- Facts: {"parse_error":"#));
    assert!(aggregation[0].contains("Apple launched a phone."));

    let value = serde_json::to_value(&output.reports[0]).unwrap();
    assert_eq!(value["facts"]["raw"], "Apple launched a phone.");
    assert_eq!(value["report"]["note"], PARTIAL_DATA_NOTE);
}
