// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::DocumentError;
use thiserror::Error;

/// 分析周期错误类型
///
/// 所有错误都只作用于单个分析周期，页面始终保持可再次触发的状态
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// 与评分服务通信失败（网络错误、超时）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 评分服务返回非 2xx 状态
    #[error("Rater returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// 响应结构或长度不符合约定
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// 没有可分析的评论
    #[error("No comments to analyze")]
    EmptyInput,

    /// 用户取消
    #[error("Analysis canceled")]
    Canceled,

    /// 页面后端错误
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// 分析任务异常终止
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// 判断错误是否可重试
    ///
    /// 只有网络错误与 5xx 会被重试，契约错误与取消永远不会
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Transport(_) => true,
            AnalysisError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 用于日志与指标的错误分类标签
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Transport(_) | AnalysisError::HttpStatus { .. } => "transport",
            AnalysisError::ContractViolation(_) => "contract_violation",
            AnalysisError::EmptyInput => "empty_input",
            AnalysisError::Canceled => "canceled",
            AnalysisError::Document(_) => "document",
            AnalysisError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AnalysisError::ContractViolation(format!("malformed response body: {}", err))
        } else {
            AnalysisError::Transport(err.to_string())
        }
    }
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("订阅页面事件失败: {0}")]
    SubscriptionFailed(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<DocumentError> for WorkerError {
    fn from(err: DocumentError) -> Self {
        WorkerError::SubscriptionFailed(err.to_string())
    }
}
