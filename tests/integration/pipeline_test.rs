// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{build_pipeline, received_batches, start_rater};
use commentrs::domain::models::analysis::{CycleTrigger, LoadStatus};
use commentrs::engines::memory_document::MemoryDocument;
use commentrs::utils::errors::AnalysisError;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn full_analysis_rates_every_loaded_comment() {
    let rater = start_rater().await;
    let document = Arc::new(MemoryDocument::with_comments(["great video", "too fast"]));
    document.queue_batch(["loved the part about ownership"]);
    let pipeline = build_pipeline(document.clone(), &rater.uri());

    let (outcome, report) = pipeline
        .analyze(3, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, LoadStatus::Reached);
    assert_eq!(report.extracted, 3);
    assert_eq!(document.total_badges(), 3);
    assert_eq!(document.badges(0)[0].quality, 2.0);
    assert_eq!(document.badges(2)[0].quality, 5.0);

    let summary = document.summary().unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.mean_difficulty, 3.0);

    // One request carrying the whole batch, in page order.
    assert_eq!(
        received_batches(&rater).await,
        vec![vec![
            "great video".to_string(),
            "too fast".to_string(),
            "loved the part about ownership".to_string(),
        ]]
    );
}

#[tokio::test]
async fn stalled_page_still_rates_partial_results() {
    let rater = start_rater().await;
    let document = Arc::new(MemoryDocument::with_comments(["only one"]));
    let pipeline = build_pipeline(document.clone(), &rater.uri());

    let (outcome, report) = pipeline
        .analyze(100, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, LoadStatus::Stalled);
    assert_eq!(outcome.progress.current_count, 1);
    assert_eq!(report.annotated, 1);
}

#[tokio::test]
async fn short_response_leaves_page_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "quality": 5, "difficulty": 2 }])),
        )
        .mount(&server)
        .await;
    let document = Arc::new(MemoryDocument::with_comments(["great video", "too fast"]));
    let pipeline = build_pipeline(document.clone(), &server.uri());

    let err = pipeline
        .run_cycle(CycleTrigger::User, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::ContractViolation(_)));
    assert_eq!(document.total_badges(), 0);
    assert!(document.summary().is_none());
}

#[tokio::test]
async fn unreachable_rater_is_a_transport_error() {
    // Nothing listens on port 1.
    let document = Arc::new(MemoryDocument::with_comments(["a"]));
    let pipeline = build_pipeline(document.clone(), "http://127.0.0.1:1");

    let err = pipeline
        .run_cycle(CycleTrigger::User, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Transport(_)));
    assert_eq!(document.total_badges(), 0);
}

#[tokio::test]
async fn repeated_user_cycles_do_not_duplicate_badges() {
    let rater = start_rater().await;
    let document = Arc::new(MemoryDocument::with_comments(["a b", "c"]));
    let pipeline = build_pipeline(document.clone(), &rater.uri());
    let cancel = CancellationToken::new();

    let first = pipeline.run_cycle(CycleTrigger::User, &cancel).await.unwrap();
    let second = pipeline.run_cycle(CycleTrigger::User, &cancel).await.unwrap();

    assert_eq!(first.annotated, 2);
    assert_eq!(second.annotated, 0);
    assert_eq!(document.total_badges(), 2);
    assert_eq!(document.summary_writes(), 2);
}
