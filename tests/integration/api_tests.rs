// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, wait_until_idle};
use axum::http::StatusCode;
use commentrs::domain::models::rating::RatingSummary;
use commentrs::engines::memory_document::MemoryDocument;
use serde_json::{json, Value};

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app(MemoryDocument::new()).await;

    let response = app.server.get("/v1/version").await;

    response.assert_status_ok();
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn start_analysis_then_export_csv() {
    let document = MemoryDocument::with_comments(["great video", "too fast"]);
    document.queue_batch(["what a talk"]);
    let app = create_test_app(document).await;

    let response = app
        .server
        .post("/v1/analysis")
        .json(&json!({ "target_count": 3 }))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["phase"], "loading");
    assert_eq!(body["target_count"], 3);

    wait_until_idle(&app.controller).await;

    let status: Value = app.server.get("/v1/analysis").await.json();
    assert_eq!(status["phase"], "completed");
    assert_eq!(status["load_status"], "reached");
    assert_eq!(status["annotated"], 3);
    let summary: RatingSummary = serde_json::from_value(status["summary"].clone()).unwrap();
    assert_eq!(summary.mean_difficulty, 3.0);

    let export = app.server.get("/v1/analysis/export").await;
    export.assert_status_ok();
    assert!(export
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        export.text(),
        "text,quality,difficulty\r\ngreat video,2,3\r\ntoo fast,2,3\r\nwhat a talk,3,3\r\n"
    );
}

#[tokio::test]
async fn default_target_is_used_when_omitted() {
    let app = create_test_app(MemoryDocument::with_comments(["a"])).await;

    let body: Value = app
        .server
        .post("/v1/analysis")
        .json(&json!({}))
        .await
        .json();

    assert_eq!(body["target_count"], 4);
    wait_until_idle(&app.controller).await;
}

#[tokio::test]
async fn second_start_conflicts_while_running() {
    let document = MemoryDocument::with_comments(["a"]);
    for _ in 0..50 {
        document.queue_batch(["more"]);
    }
    let app = create_test_app(document).await;

    app.server
        .post("/v1/analysis")
        .json(&json!({ "target_count": 100 }))
        .await
        .assert_status(StatusCode::ACCEPTED);

    let conflict = app
        .server
        .post("/v1/analysis")
        .json(&json!({ "target_count": 5 }))
        .await;
    conflict.assert_status(StatusCode::CONFLICT);
    assert!(conflict.json::<Value>()["error"].is_string());

    app.server
        .delete("/v1/analysis")
        .await
        .assert_status(StatusCode::ACCEPTED);
    let status = wait_until_idle(&app.controller).await;
    assert_eq!(
        serde_json::to_value(status.phase).unwrap(),
        json!("canceled")
    );
    assert_eq!(app.document.total_badges(), 0);
}

#[tokio::test]
async fn invalid_targets_are_rejected() {
    let app = create_test_app(MemoryDocument::with_comments(["a"])).await;

    app.server
        .post("/v1/analysis")
        .json(&json!({ "target_count": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post("/v1/analysis")
        .json(&json!({ "target_count": 101 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_and_export_without_analysis_are_not_found() {
    let app = create_test_app(MemoryDocument::with_comments(["a"])).await;

    app.server
        .delete("/v1/analysis")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/v1/analysis/export")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let status: Value = app.server.get("/v1/analysis").await.json();
    assert_eq!(status["phase"], "idle");
}
