// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rating::{RatingResult, RatingSummary};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

/// 页面后端错误类型
#[derive(Error, Debug)]
pub enum DocumentError {
    /// 浏览器或 CDP 通道错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 页面脚本执行失败
    #[error("Script failed: {0}")]
    Script(String),
    /// 评论容器不存在
    #[error("Comments container not present")]
    ContainerMissing,
    /// 节点已从文档中移除
    #[error("Comment node {0:?} is no longer attached")]
    NodeDetached(NodeHandle),
}

/// 评论节点句柄
///
/// 对活动文档节点的不透明引用，由页面后端分配和解释。
/// 句柄必须跟随节点本身：在列表中间插入新节点（例如展开回复）后，
/// 旧句柄仍然指向原来的节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeHandle(pub u64);

/// 页面中读取到的原始评论节点
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub handle: NodeHandle,
    /// 节点当前渲染的文本（未裁剪）
    pub text: String,
    /// 节点上是否已有评分标记
    pub rated: bool,
}

/// 页面结构事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// 评论容器首次出现
    ContainerAppeared,
    /// 评论容器内部发生结构变化
    ContainerChanged,
}

pub type DocumentEventStream = BoxStream<'static, DocumentEvent>;

/// 评论页面能力
///
/// 流水线对宿主页面的全部依赖都经由此特质注入，
/// 选择器等页面结构细节只存在于具体实现中
#[async_trait]
pub trait CommentDocument: Send + Sync {
    /// 统计当前已渲染的评论节点数量
    async fn count_comments(&self) -> Result<usize, DocumentError>;

    /// 按文档顺序读取当前所有评论节点
    async fn comment_nodes(&self) -> Result<Vec<CommentNode>, DocumentError>;

    /// 向下滚动一步以触发懒加载
    async fn scroll_step(&self) -> Result<(), DocumentError>;

    /// 恢复滚动位置（回到顶部）
    async fn restore_scroll(&self) -> Result<(), DocumentError>;

    /// 节点上是否已有评分标记
    async fn is_rated(&self, handle: NodeHandle) -> Result<bool, DocumentError>;

    /// 在节点后追加评分徽章
    async fn append_badge(
        &self,
        handle: NodeHandle,
        rating: &RatingResult,
    ) -> Result<(), DocumentError>;

    /// 设置节点的评分标记
    async fn mark_rated(&self, handle: NodeHandle) -> Result<(), DocumentError>;

    /// 覆盖写入汇总区域
    async fn write_summary(&self, summary: &RatingSummary) -> Result<(), DocumentError>;

    /// 评论容器是否已出现
    async fn container_present(&self) -> Result<bool, DocumentError>;

    /// 订阅页面结构事件
    async fn subscribe(&self) -> Result<DocumentEventStream, DocumentError>;

    /// 后端名称
    fn name(&self) -> &'static str;
}
