// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LoaderSettings;
use crate::domain::models::analysis::{LoadOutcome, LoadProgress, LoadStatus};
use crate::engines::traits::CommentDocument;
use crate::utils::errors::AnalysisError;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 连续无增长的默认放弃阈值
pub const DEFAULT_MAX_STALL_RETRIES: u32 = 10;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// 评论加载器
///
/// 周期性统计页面上的评论数，并通过滚动触发懒加载，直到达到目标数量、
/// 页面停止增长或被取消。无论哪种结果，结束时都会把页面滚回顶部。
#[derive(Debug, Clone)]
pub struct CommentLoader {
    poll_interval: Duration,
    max_stall_retries: u32,
}

impl Default for CommentLoader {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), DEFAULT_MAX_STALL_RETRIES)
    }
}

impl CommentLoader {
    pub fn new(poll_interval: Duration, max_stall_retries: u32) -> Self {
        Self {
            // tokio::time::interval panics on a zero period.
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            max_stall_retries: max_stall_retries.max(1),
        }
    }

    pub fn from_settings(settings: &LoaderSettings) -> Self {
        Self::new(settings.poll_interval(), settings.max_stall_retries)
    }

    /// 加载评论直到达到 `target_count`
    ///
    /// 总会结束：要么数量达标，要么连续 `max_stall_retries` 次没有增长，
    /// 要么取消令牌被触发。只有页面后端本身出错时才返回 `Err`。
    pub async fn load_until(
        &self,
        document: &dyn CommentDocument,
        target_count: usize,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, AnalysisError> {
        self.load_until_with_progress(document, target_count, cancel, |_| {})
            .await
    }

    /// 与 [`load_until`](Self::load_until) 相同，每次计数后回调当前进度
    pub async fn load_until_with_progress<F>(
        &self,
        document: &dyn CommentDocument,
        target_count: usize,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<LoadOutcome, AnalysisError>
    where
        F: FnMut(&LoadProgress) + Send,
    {
        let mut progress = LoadProgress::new(target_count);

        let result = self
            .poll(document, &mut progress, cancel, &mut on_progress)
            .await;

        // Scroll position is restored on every exit path, including errors.
        if let Err(e) = document.restore_scroll().await {
            warn!("Failed to restore scroll position: {}", e);
            if result.is_ok() {
                return Err(e.into());
            }
        }

        let status = result?;
        info!(
            "Comment loading finished: {:?} ({}/{} comments, {} stalled ticks)",
            status, progress.current_count, progress.target_count, progress.stall_retries
        );

        Ok(LoadOutcome { progress, status })
    }

    async fn poll<F>(
        &self,
        document: &dyn CommentDocument,
        progress: &mut LoadProgress,
        cancel: &CancellationToken,
        on_progress: &mut F,
    ) -> Result<LoadStatus, AnalysisError>
    where
        F: FnMut(&LoadProgress) + Send,
    {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // None forces the first tick to count as growth, so the first scroll always happens.
        let mut last_count: Option<usize> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(LoadStatus::Canceled),
                _ = ticker.tick() => {}
            }

            let count = document.count_comments().await?;
            progress.current_count = count;

            if progress.target_reached() {
                on_progress(progress);
                return Ok(LoadStatus::Reached);
            }

            if last_count == Some(count) {
                progress.stall_retries += 1;
                on_progress(progress);
                debug!(
                    "No new comments ({} rendered), stall {}/{}",
                    count, progress.stall_retries, self.max_stall_retries
                );
                if progress.stall_retries >= self.max_stall_retries {
                    return Ok(LoadStatus::Stalled);
                }
                continue;
            }

            progress.stall_retries = 0;
            last_count = Some(count);
            on_progress(progress);

            if cancel.is_cancelled() {
                return Ok(LoadStatus::Canceled);
            }
            document.scroll_step().await?;
        }
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
