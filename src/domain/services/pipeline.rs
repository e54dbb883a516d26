// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::analysis::{
    CycleReport, CycleTrigger, LoadOutcome, LoadProgress, LoadStatus,
};
use crate::domain::models::comment::RatedComment;
use crate::domain::services::annotator::annotate;
use crate::domain::services::extractor::{extract_comments, unrated};
use crate::domain::services::loader::CommentLoader;
use crate::domain::services::rater::CommentRater;
use crate::engines::traits::CommentDocument;
use crate::infrastructure::metrics as m;
use crate::utils::errors::AnalysisError;
use chrono::Utc;
use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 流水线进度事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineEvent {
    /// 加载中
    Loading(LoadProgress),
    /// 加载结束
    Loaded(LoadOutcome),
    /// 正在评分指定数量的评论
    Rating { comments: usize },
}

/// 评论分析流水线
///
/// 串联加载器、提取器、评分器与标注器。任意时刻最多只有一个周期在执行，
/// 用户触发与观察器触发的周期共用同一把运行锁。
pub struct Pipeline {
    document: Arc<dyn CommentDocument>,
    rater: Arc<dyn CommentRater>,
    loader: CommentLoader,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        document: Arc<dyn CommentDocument>,
        rater: Arc<dyn CommentRater>,
        loader: CommentLoader,
    ) -> Self {
        Self {
            document,
            rater,
            loader,
            run_lock: Mutex::new(()),
        }
    }

    pub fn document(&self) -> &Arc<dyn CommentDocument> {
        &self.document
    }

    /// 用户发起的完整分析：加载到目标数量后评分所有已加载评论
    ///
    /// 加载被取消时直接返回 [`AnalysisError::Canceled`]，不会发起网络请求。
    pub async fn analyze<F>(
        &self,
        target_count: usize,
        cancel: &CancellationToken,
        on_event: F,
    ) -> Result<(LoadOutcome, CycleReport), AnalysisError>
    where
        F: Fn(PipelineEvent) + Send + Sync,
    {
        let _guard = self.run_lock.lock().await;

        let outcome = self
            .loader
            .load_until_with_progress(self.document.as_ref(), target_count, cancel, |p| {
                on_event(PipelineEvent::Loading(*p))
            })
            .await?;
        on_event(PipelineEvent::Loaded(outcome));
        gauge!(m::LOADED_COMMENTS).set(outcome.progress.current_count as f64);

        if outcome.status == LoadStatus::Canceled {
            counter!(m::CYCLES_TOTAL, "trigger" => "user", "outcome" => "canceled").increment(1);
            return Err(AnalysisError::Canceled);
        }

        let report = self
            .cycle(CycleTrigger::User, cancel, &on_event)
            .await;
        record_outcome(CycleTrigger::User, &report);
        Ok((outcome, report?))
    }

    /// 单个 提取 → 评分 → 标注 周期（不滚动页面）
    ///
    /// 观察器触发时只评分尚未标注的评论，没有新评论时以
    /// [`AnalysisError::EmptyInput`] 短路，不发起网络请求。
    pub async fn run_cycle(
        &self,
        trigger: CycleTrigger,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, AnalysisError> {
        let _guard = self.run_lock.lock().await;
        let report = self.cycle(trigger, cancel, &|_| {}).await;
        record_outcome(trigger, &report);
        report
    }

    async fn cycle<F>(
        &self,
        trigger: CycleTrigger,
        cancel: &CancellationToken,
        on_event: &F,
    ) -> Result<CycleReport, AnalysisError>
    where
        F: Fn(PipelineEvent) + Send + Sync,
    {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Canceled);
        }

        let mut records = extract_comments(self.document.as_ref()).await?;
        if trigger == CycleTrigger::Watcher {
            records = unrated(records);
        }
        if records.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        on_event(PipelineEvent::Rating {
            comments: texts.len(),
        });
        let results = self.rater.rate(&texts, cancel).await?;

        if cancel.is_cancelled() {
            return Err(AnalysisError::Canceled);
        }

        let annotation = annotate(self.document.as_ref(), &mut records, &results).await?;

        let table = records
            .iter()
            .zip(&results)
            .map(|(record, rating)| RatedComment::new(record.text.clone(), rating))
            .collect();

        info!(
            "{} cycle rated {} comments, {} new badges",
            trigger,
            texts.len(),
            annotation.annotated
        );

        Ok(CycleReport {
            trigger,
            extracted: texts.len(),
            annotated: annotation.annotated,
            summary: annotation.summary,
            table,
            finished_at: Utc::now(),
        })
    }
}

fn record_outcome(trigger: CycleTrigger, report: &Result<CycleReport, AnalysisError>) {
    let trigger_label = match trigger {
        CycleTrigger::User => "user",
        CycleTrigger::Watcher => "watcher",
    };
    let outcome = match report {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    counter!(m::CYCLES_TOTAL, "trigger" => trigger_label, "outcome" => outcome).increment(1);

    if let Err(e) = report {
        match e {
            AnalysisError::EmptyInput | AnalysisError::Canceled => {}
            other => warn!("{} cycle produced no annotations: {}", trigger, other),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
