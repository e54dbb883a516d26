// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    application::dto::analysis_request::StartAnalysisDto,
    config::settings::AnalysisSettings,
    domain::{
        models::{
            analysis::{
                AnalysisPhase, AnalysisStatus, CycleReport, CycleTrigger, LoadOutcome,
                WatcherState,
            },
            comment::RatedComment,
            rating::{RatingResult, RatingSummary},
        },
        services::pipeline::{Pipeline, PipelineEvent},
    },
    utils::{csv_export::to_csv, errors::AnalysisError},
};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Error, Debug)]
pub enum AnalysisUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("An analysis is already running")]
    AlreadyRunning,
    #[error("No analysis is running")]
    NotRunning,
}

#[derive(Default)]
struct ControllerState {
    status: AnalysisStatus,
    cancel: Option<CancellationToken>,
    table: Vec<RatedComment>,
}

/// 分析控制器
///
/// 管理用户发起的分析（同一时刻至多一个）、记录观察器周期的结果，
/// 并为控制接口提供状态快照和 CSV 导出。
pub struct AnalysisController {
    pipeline: Arc<Pipeline>,
    default_target_count: u32,
    max_target_count: u32,
    state: Mutex<ControllerState>,
    watcher: Mutex<Option<watch::Receiver<WatcherState>>>,
}

impl AnalysisController {
    pub fn new(pipeline: Arc<Pipeline>, settings: &AnalysisSettings) -> Self {
        Self {
            pipeline,
            default_target_count: settings.default_target_count,
            max_target_count: settings.max_target_count,
            state: Mutex::new(ControllerState::default()),
            watcher: Mutex::new(None),
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// 关联观察器状态，之后的状态快照会带上观察器状态
    pub fn attach_watcher(&self, state: watch::Receiver<WatcherState>) {
        *self.watcher.lock() = Some(state);
    }

    /// 启动一次用户分析
    ///
    /// 分析在后台任务中执行，立即返回初始状态
    ///
    /// # 参数
    ///
    /// * `dto` - 启动请求，目标数缺省时使用配置的默认值
    ///
    /// # 返回值
    ///
    /// 已有分析在执行时返回 [`AnalysisUseCaseError::AlreadyRunning`]
    pub fn start(
        self: &Arc<Self>,
        dto: StartAnalysisDto,
    ) -> Result<AnalysisStatus, AnalysisUseCaseError> {
        dto.validate()
            .map_err(|e| AnalysisUseCaseError::ValidationError(e.to_string()))?;

        let target = dto.target_count.unwrap_or(self.default_target_count);
        if target > self.max_target_count {
            return Err(AnalysisUseCaseError::ValidationError(format!(
                "target_count must be at most {}",
                self.max_target_count
            )));
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let snapshot = {
            let mut state = self.state.lock();
            if state.status.phase.is_running() {
                return Err(AnalysisUseCaseError::AlreadyRunning);
            }
            state.status = AnalysisStatus {
                id: Some(id),
                phase: AnalysisPhase::Loading,
                target_count: Some(target as usize),
                started_at: Some(Utc::now()),
                ..AnalysisStatus::default()
            };
            state.cancel = Some(cancel.clone());
            state.status.clone()
        };

        info!("Starting analysis {} with target {}", id, target);

        let this = Arc::clone(self);
        let worker = Arc::clone(self);
        let run = tokio::spawn(async move {
            worker
                .pipeline
                .analyze(target as usize, &cancel, |event| worker.on_event(id, event))
                .await
        });
        // A panicking run must still leave the running phase.
        tokio::spawn(async move {
            let result = match run.await {
                Ok(result) => result,
                Err(e) => Err(AnalysisError::Internal(format!("analysis task aborted: {}", e))),
            };
            this.finish(id, result);
        });

        Ok(self.with_watcher(snapshot))
    }

    /// 取消正在执行的用户分析
    pub fn cancel(&self) -> Result<AnalysisStatus, AnalysisUseCaseError> {
        let snapshot = {
            let state = self.state.lock();
            match (&state.cancel, state.status.phase.is_running()) {
                (Some(token), true) => {
                    token.cancel();
                    state.status.clone()
                }
                _ => return Err(AnalysisUseCaseError::NotRunning),
            }
        };
        info!("Cancel requested for analysis {:?}", snapshot.id);
        Ok(self.with_watcher(snapshot))
    }

    /// 当前状态快照
    pub fn status(&self) -> AnalysisStatus {
        let snapshot = self.state.lock().status.clone();
        self.with_watcher(snapshot)
    }

    /// 至今评分过的所有行（CSV），没有时返回 None
    ///
    /// 用户分析完成时表被整体替换，观察器周期只追加新评分的行。
    pub fn export_csv(&self) -> Option<String> {
        let state = self.state.lock();
        if state.table.is_empty() {
            None
        } else {
            Some(to_csv(&state.table))
        }
    }

    /// 执行一次观察器触发的周期并记录结果
    pub async fn run_watcher_cycle(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, AnalysisError> {
        let result = self.pipeline.run_cycle(CycleTrigger::Watcher, cancel).await;
        self.record_cycle(&result);
        result
    }

    /// 记录观察器周期的结果：成功时把新行追加到导出表，并按合并后的表重算汇总
    pub fn record_cycle(&self, result: &Result<CycleReport, AnalysisError>) {
        if let Ok(report) = result {
            let mut state = self.state.lock();
            state.table.extend(report.table.iter().cloned());
            let results: Vec<RatingResult> = state
                .table
                .iter()
                .map(|row| RatingResult::new(row.quality, row.difficulty))
                .collect();
            state.status.summary = RatingSummary::from_results(&results);
            state.status.annotated += report.annotated;
        }
    }

    fn with_watcher(&self, mut status: AnalysisStatus) -> AnalysisStatus {
        status.watcher = self.watcher.lock().as_ref().map(|rx| *rx.borrow());
        status
    }

    fn on_event(&self, id: Uuid, event: PipelineEvent) {
        let mut state = self.state.lock();
        if state.status.id != Some(id) {
            return;
        }
        match event {
            PipelineEvent::Loading(progress) => state.status.progress = Some(progress),
            PipelineEvent::Loaded(outcome) => {
                state.status.progress = Some(outcome.progress);
                state.status.load_status = Some(outcome.status);
            }
            PipelineEvent::Rating { .. } => state.status.phase = AnalysisPhase::Rating,
        }
    }

    fn finish(&self, id: Uuid, result: Result<(LoadOutcome, CycleReport), AnalysisError>) {
        let mut state = self.state.lock();
        if state.status.id != Some(id) {
            return;
        }
        state.cancel = None;
        state.status.finished_at = Some(Utc::now());

        match result {
            Ok((outcome, report)) => {
                info!(
                    "Analysis {} completed: {} comments rated ({:?})",
                    id, report.extracted, outcome.status
                );
                state.status.phase = AnalysisPhase::Completed;
                state.status.summary = report.summary;
                state.status.annotated = report.annotated;
                state.table = report.table;
            }
            Err(AnalysisError::Canceled) => {
                info!("Analysis {} canceled", id);
                state.status.phase = AnalysisPhase::Canceled;
            }
            Err(e) => {
                warn!("Analysis {} failed: {}", id, e);
                state.status.phase = AnalysisPhase::Failed;
                state.status.error = Some(e.to_string());
            }
        }
    }
}
