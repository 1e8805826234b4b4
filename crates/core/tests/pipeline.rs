mod common;

use common::{patent_match, CountingEmbedder, MockIndex, ScriptedChat, DIM};
use patentguard_core::analyzer::RiskAnalyzer;
use patentguard_core::embeddings::Encoder;
use patentguard_core::error::PipelineError;
use patentguard_core::models::RiskLevel;
use patentguard_core::pipeline::{Pipeline, TOP_K};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const GOOD_REPLY: &str = r#"{
    "risk_level": "High",
    "analysis": "Close overlap with the hydration tracker.",
    "conflicting_patents": ["US-1"],
    "recommendations": "Differentiate the display."
}"#;

fn build(
    embedder: Arc<CountingEmbedder>,
    index: Arc<MockIndex>,
    chat: Arc<ScriptedChat>,
) -> Pipeline {
    Pipeline::new(
        Encoder::new(embedder, DIM),
        index,
        RiskAnalyzer::new(chat, 0.3, 2000),
    )
}

#[tokio::test]
async fn short_query_is_rejected_before_any_collaborator_call() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::with_matches(vec![patent_match(
        "US-1", 0.9, "T", "A",
    )]));
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder.clone(), index.clone(), chat.clone());

    let err = pipeline.run("   short   ").await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.query_calls.load(Ordering::SeqCst), 0);
    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn index_is_always_queried_with_top_k_five() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::with_matches(vec![patent_match(
        "US-1", 0.9, "T", "A",
    )]));
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder, index.clone(), chat);

    pipeline
        .run("A smart water bottle that tracks hydration")
        .await
        .unwrap();
    assert_eq!(*index.seen_top_k.lock().unwrap(), vec![TOP_K]);
    assert_eq!(TOP_K, 5);
}

#[tokio::test]
async fn empty_index_fails_with_no_prior_art_before_analysis() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::default());
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder, index, chat.clone());

    let err = pipeline
        .run("A smart water bottle that tracks hydration")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoPriorArt));
    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn happy_path_returns_analysis_and_the_retrieved_matches() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::with_matches(vec![
        patent_match("US-1", 0.91, "Hydration tracker", "A bottle with sensors."),
        patent_match("US-2", 0.77, "Smart container", "A container with a display."),
    ]));
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder, index, chat);

    let result = pipeline
        .run("A smart water bottle that tracks hydration via Bluetooth and LED display")
        .await
        .unwrap();
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.conflicting_patents, vec!["US-1"]);
    assert_eq!(result.retrieved_matches.len(), 2);
    assert_eq!(result.retrieved_matches[0].id, "US-1");
    assert_eq!(result.retrieved_matches[1].id, "US-2");
}

#[tokio::test]
async fn index_failure_propagates_as_index_unavailable() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex {
        fail_queries: true,
        ..MockIndex::default()
    });
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder, index, chat);

    let err = pipeline
        .run("A smart water bottle that tracks hydration")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::IndexUnavailable(_)));
}

#[tokio::test]
async fn chat_failure_propagates_as_generation_error() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::with_matches(vec![patent_match(
        "US-1", 0.9, "T", "A",
    )]));
    let chat = Arc::new(ScriptedChat::failing());
    let pipeline = build(embedder, index, chat);

    let err = pipeline
        .run("A smart water bottle that tracks hydration")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Generation(_)));
}

#[tokio::test]
async fn query_is_trimmed_before_validation() {
    let embedder = Arc::new(CountingEmbedder::default());
    let index = Arc::new(MockIndex::with_matches(vec![patent_match(
        "US-1", 0.9, "T", "A",
    )]));
    let chat = Arc::new(ScriptedChat::replying(GOOD_REPLY));
    let pipeline = build(embedder.clone(), index, chat);

    pipeline
        .run("   a valid invention idea   ")
        .await
        .unwrap();
    let seen = embedder.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], "a valid invention idea");
}
