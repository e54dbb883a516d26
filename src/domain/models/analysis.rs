// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::comment::RatedComment;
use crate::domain::models::rating::RatingSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 加载进度
///
/// 仅在一次加载周期内存在，完成或取消后丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    /// 当前已渲染的评论数
    pub current_count: usize,
    /// 目标评论数
    pub target_count: usize,
    /// 连续无增长的轮询次数
    pub stall_retries: u32,
}

impl LoadProgress {
    pub fn new(target_count: usize) -> Self {
        Self {
            current_count: 0,
            target_count,
            stall_retries: 0,
        }
    }

    pub fn target_reached(&self) -> bool {
        self.current_count >= self.target_count
    }
}

/// 加载结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// 达到目标数量
    Reached,
    /// 页面不再产生新评论，返回部分结果
    Stalled,
    /// 用户取消
    Canceled,
}

/// 加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub progress: LoadProgress,
    pub status: LoadStatus,
}

/// 周期触发来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTrigger {
    /// 用户发起的完整分析：评分所有已加载评论
    User,
    /// 观察器发起的增量分析：只评分尚未标注的评论
    Watcher,
}

impl fmt::Display for CycleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleTrigger::User => write!(f, "user"),
            CycleTrigger::Watcher => write!(f, "watcher"),
        }
    }
}

/// 单个流水线周期的结果
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub trigger: CycleTrigger,
    /// 送去评分的评论数
    pub extracted: usize,
    /// 本周期新增的徽章数
    pub annotated: usize,
    /// 写入页面的汇总
    pub summary: Option<RatingSummary>,
    /// 可导出的 (文本, 质量, 难度) 表
    pub table: Vec<RatedComment>,
    pub finished_at: DateTime<Utc>,
}

/// 用户分析的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Loading,
    Rating,
    Completed,
    Failed,
    Canceled,
}

impl AnalysisPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, AnalysisPhase::Loading | AnalysisPhase::Rating)
    }
}

/// 观察器状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    /// 尚未订阅页面事件
    Idle,
    /// 已订阅，等待评论容器出现
    WaitingForContainer,
    /// 容器已出现，每次结构变化都会触发流水线
    Active,
    /// 已显式拆除
    Disconnected,
}

/// 用户分析的状态快照
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStatus {
    pub id: Option<Uuid>,
    pub phase: AnalysisPhase,
    pub target_count: Option<usize>,
    /// 最近一次加载进度
    pub progress: Option<LoadProgress>,
    /// 加载结束的原因，加载中为空
    pub load_status: Option<LoadStatus>,
    pub summary: Option<RatingSummary>,
    pub annotated: usize,
    pub error: Option<String>,
    pub watcher: Option<WatcherState>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for AnalysisStatus {
    fn default() -> Self {
        Self {
            id: None,
            phase: AnalysisPhase::Idle,
            target_count: None,
            progress: None,
            load_status: None,
            summary: None,
            annotated: 0,
            error: None,
            watcher: None,
            started_at: None,
            finished_at: None,
        }
    }
}
