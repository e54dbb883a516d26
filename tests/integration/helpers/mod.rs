// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use commentrs::application::use_cases::analysis_use_case::AnalysisController;
use commentrs::config::settings::{AnalysisSettings, RaterSettings};
use commentrs::domain::models::analysis::AnalysisStatus;
use commentrs::domain::services::loader::CommentLoader;
use commentrs::domain::services::pipeline::Pipeline;
use commentrs::domain::services::rater::HttpRater;
use commentrs::engines::memory_document::MemoryDocument;
use commentrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// 模拟评分服务：质量为评论词数（上限 5），难度固定为 3
pub struct WordCountRater;

impl Respond for WordCountRater {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let ratings: Vec<Value> = body["comments"]
            .as_array()
            .map(|comments| {
                comments
                    .iter()
                    .map(|c| {
                        let words = c.as_str().unwrap_or_default().split_whitespace().count();
                        json!({ "quality": words.min(5), "difficulty": 3 })
                    })
                    .collect()
            })
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(ratings)
    }
}

pub async fn start_rater() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict_extension"))
        .respond_with(WordCountRater)
        .mount(&server)
        .await;
    server
}

/// 评分服务收到的每批评论
pub async fn received_batches(server: &MockServer) -> Vec<Vec<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            serde_json::from_value(body["comments"].clone()).unwrap()
        })
        .collect()
}

pub fn rater_settings(base_url: &str) -> RaterSettings {
    RaterSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        max_retries: 0,
        initial_backoff_ms: 0,
    }
}

pub fn analysis_settings() -> AnalysisSettings {
    AnalysisSettings {
        default_target_count: 4,
        max_target_count: 100,
        watch: false,
    }
}

pub fn build_pipeline(document: Arc<MemoryDocument>, rater_url: &str) -> Arc<Pipeline> {
    let rater = HttpRater::new(&rater_settings(rater_url)).unwrap();
    Arc::new(Pipeline::new(
        document,
        Arc::new(rater),
        CommentLoader::new(Duration::from_millis(10), 3),
    ))
}

pub fn build_controller(document: Arc<MemoryDocument>, rater_url: &str) -> Arc<AnalysisController> {
    Arc::new(AnalysisController::new(
        build_pipeline(document, rater_url),
        &analysis_settings(),
    ))
}

pub async fn wait_until_idle(controller: &AnalysisController) -> AnalysisStatus {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = controller.status();
            if !status.phase.is_running() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("analysis did not finish")
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub document: Arc<MemoryDocument>,
    pub controller: Arc<AnalysisController>,
    pub rater: MockServer,
}

pub async fn create_test_app(document: MemoryDocument) -> TestApp {
    let document = Arc::new(document);
    let rater = start_rater().await;
    let controller = build_controller(document.clone(), &rater.uri());
    let server = TestServer::new(routes::routes(controller.clone())).unwrap();

    TestApp {
        server,
        document,
        controller,
        rater,
    }
}
