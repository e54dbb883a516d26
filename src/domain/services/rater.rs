// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RaterSettings;
use crate::domain::models::rating::RatingResult;
use crate::infrastructure::metrics as m;
use crate::utils::errors::AnalysisError;
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// 评分服务路径
pub const PREDICT_PATH: &str = "predict_extension";

#[async_trait]
pub trait CommentRater: Send + Sync {
    /// 对整批评论评分
    ///
    /// 成功时结果与输入逐位对齐且长度相等；任何失败都以错误返回，
    /// 调用方应视为“本周期无评分”。
    async fn rate(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<RatingResult>, AnalysisError>;

    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    comments: &'a [String],
}

/// HTTP 评分服务客户端
///
/// # 协议
///
/// `POST {base_url}/predict_extension`，请求体 `{"comments": [...]}`，
/// 响应为与请求等长的 `[{"quality": n, "difficulty": n}, ...]`。
///
/// # 失败处理
///
/// 网络错误与 5xx 按 [`RetryPolicy`] 有限次重试；4xx、格式错误与
/// 长度不符直接放弃整批。每次请求都有超时，取消会中断请求与退避等待。
pub struct HttpRater {
    client: reqwest::Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl HttpRater {
    pub fn new(settings: &RaterSettings) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("commentrs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: predict_endpoint(&settings.base_url)?,
            retry: RetryPolicy::from_settings(settings),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_batch(&self, texts: &[String]) -> Result<Vec<RatingResult>, AnalysisError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest { comments: texts })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        histogram!(m::RATER_LATENCY_SECONDS).record(start.elapsed().as_secs_f64());

        let results: Vec<RatingResult> = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::ContractViolation(format!("malformed rating response: {}", e))
        })?;

        if results.len() != texts.len() {
            return Err(AnalysisError::ContractViolation(format!(
                "expected {} ratings, got {}",
                texts.len(),
                results.len()
            )));
        }

        Ok(results)
    }
}

#[async_trait]
impl CommentRater for HttpRater {
    async fn rate(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<RatingResult>, AnalysisError> {
        if texts.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Canceled);
            }

            debug!(
                "Sending {} comments to {} (attempt {})",
                texts.len(),
                self.endpoint,
                attempt + 1
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AnalysisError::Canceled),
                r = self.send_batch(texts) => r,
            };

            match result {
                Ok(ratings) => {
                    counter!(m::RATER_REQUESTS_TOTAL, "outcome" => "success").increment(1);
                    return Ok(ratings);
                }
                Err(e) if e.is_retryable() && self.retry.should_retry(attempt) => {
                    counter!(m::RATER_REQUESTS_TOTAL, "outcome" => "retry").increment(1);
                    attempt += 1;
                    let backoff = self.retry.calculate_backoff(attempt);
                    warn!(
                        "Rating request failed: {}. Retrying in {:?} ({}/{})",
                        e, backoff, attempt, self.retry.max_retries
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(AnalysisError::Canceled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(e) => {
                    counter!(m::RATER_REQUESTS_TOTAL, "outcome" => e.kind()).increment(1);
                    return Err(e);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// 拼出 `{base_url}/predict_extension`，基础地址可以带路径前缀
pub fn predict_endpoint(base_url: &str) -> Result<Url, AnalysisError> {
    let mut base = Url::parse(base_url).map_err(|e| {
        AnalysisError::Transport(format!("invalid rater base url '{}': {}", base_url, e))
    })?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(PREDICT_PATH)
        .map_err(|e| AnalysisError::Transport(format!("invalid rater endpoint: {}", e)))
}

#[cfg(test)]
#[path = "rater_test.rs"]
mod tests;
