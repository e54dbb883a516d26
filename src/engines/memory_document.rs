// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rating::{RatingResult, RatingSummary};
use crate::engines::traits::{
    CommentDocument, CommentNode, DocumentError, DocumentEvent, DocumentEventStream, NodeHandle,
};
use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct MemoryNode {
    id: u64,
    text: String,
    badges: Vec<RatingResult>,
    rated: bool,
}

#[derive(Default)]
struct MemoryState {
    container_present: bool,
    nodes: Vec<MemoryNode>,
    /// 每次滚动揭示一批
    pending: VecDeque<Vec<String>>,
    summary: Option<RatingSummary>,
    summary_writes: usize,
    scroll_steps: usize,
    scroll_restores: usize,
    next_id: u64,
    fail_next_mark: bool,
    subscribers: Vec<UnboundedSender<DocumentEvent>>,
}

impl MemoryState {
    fn emit(&mut self, event: DocumentEvent) {
        self.subscribers
            .retain(|tx| tx.unbounded_send(event).is_ok());
    }

    fn append(&mut self, texts: Vec<String>) {
        if texts.is_empty() {
            return;
        }
        for text in texts {
            let node = self.new_node(text);
            self.nodes.push(node);
        }
        if self.container_present {
            self.emit(DocumentEvent::ContainerChanged);
        }
    }

    fn new_node(&mut self, text: String) -> MemoryNode {
        let id = self.next_id;
        self.next_id += 1;
        MemoryNode {
            id,
            text,
            badges: Vec::new(),
            rated: false,
        }
    }

    fn node(&self, handle: NodeHandle) -> Result<&MemoryNode, DocumentError> {
        self.nodes
            .iter()
            .find(|n| n.id == handle.0)
            .ok_or(DocumentError::NodeDetached(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut MemoryNode, DocumentError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == handle.0)
            .ok_or(DocumentError::NodeDetached(handle))
    }
}

/// 内存页面
///
/// 不依赖浏览器的评论页面模型：评论按批次懒加载，滚动一次揭示一批，
/// 徽章写入会像真实 DOM 一样产生容器变化事件。句柄是节点创建时分配的
/// 编号，中间插入的节点不会改变已有句柄。
#[derive(Default)]
pub struct MemoryDocument {
    state: Mutex<MemoryState>,
}

impl MemoryDocument {
    /// 创建一个尚未出现评论容器的空页面
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个容器已出现并已渲染给定评论的页面
    pub fn with_comments<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let doc = Self::new();
        {
            let mut state = doc.state.lock();
            state.container_present = true;
            state.append(texts.into_iter().map(Into::into).collect());
        }
        doc
    }

    /// 让评论容器出现
    pub fn show_container(&self) {
        let mut state = self.state.lock();
        if !state.container_present {
            state.container_present = true;
            state.emit(DocumentEvent::ContainerAppeared);
        }
    }

    /// 立即渲染更多评论（模拟页面自行插入）
    pub fn push_comments<I, S>(&self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .append(texts.into_iter().map(Into::into).collect());
    }

    /// 在第 `index` 个位置插入一条评论（模拟展开回复）
    pub fn insert_comment(&self, index: usize, text: impl Into<String>) {
        let mut state = self.state.lock();
        let node = state.new_node(text.into());
        let index = index.min(state.nodes.len());
        state.nodes.insert(index, node);
        if state.container_present {
            state.emit(DocumentEvent::ContainerChanged);
        }
    }

    /// 让下一次写评分标记失败，模拟节点在两次写入之间被移除
    pub fn fail_next_mark(&self) {
        self.state.lock().fail_next_mark = true;
    }

    /// 排入一批只有滚动后才会出现的评论
    pub fn queue_batch<I, S>(&self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .pending
            .push_back(texts.into_iter().map(Into::into).collect());
    }

    pub fn badges(&self, index: usize) -> Vec<RatingResult> {
        self.state
            .lock()
            .nodes
            .get(index)
            .map(|n| n.badges.clone())
            .unwrap_or_default()
    }

    pub fn total_badges(&self) -> usize {
        self.state.lock().nodes.iter().map(|n| n.badges.len()).sum()
    }

    pub fn summary(&self) -> Option<RatingSummary> {
        self.state.lock().summary
    }

    pub fn summary_writes(&self) -> usize {
        self.state.lock().summary_writes
    }

    pub fn scroll_steps(&self) -> usize {
        self.state.lock().scroll_steps
    }

    pub fn scroll_restores(&self) -> usize {
        self.state.lock().scroll_restores
    }

    pub fn len(&self) -> usize {
        self.state.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CommentDocument for MemoryDocument {
    async fn count_comments(&self) -> Result<usize, DocumentError> {
        Ok(self.state.lock().nodes.len())
    }

    async fn comment_nodes(&self) -> Result<Vec<CommentNode>, DocumentError> {
        let state = self.state.lock();
        Ok(state
            .nodes
            .iter()
            .map(|node| CommentNode {
                handle: NodeHandle(node.id),
                text: node.text.clone(),
                rated: node.rated,
            })
            .collect())
    }

    async fn scroll_step(&self) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        state.scroll_steps += 1;
        if let Some(batch) = state.pending.pop_front() {
            state.append(batch);
        }
        Ok(())
    }

    async fn restore_scroll(&self) -> Result<(), DocumentError> {
        self.state.lock().scroll_restores += 1;
        Ok(())
    }

    async fn is_rated(&self, handle: NodeHandle) -> Result<bool, DocumentError> {
        Ok(self.state.lock().node(handle)?.rated)
    }

    async fn append_badge(
        &self,
        handle: NodeHandle,
        rating: &RatingResult,
    ) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        state.node_mut(handle)?.badges.push(*rating);
        state.emit(DocumentEvent::ContainerChanged);
        Ok(())
    }

    async fn mark_rated(&self, handle: NodeHandle) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_mark) {
            return Err(DocumentError::NodeDetached(handle));
        }
        state.node_mut(handle)?.rated = true;
        Ok(())
    }

    async fn write_summary(&self, summary: &RatingSummary) -> Result<(), DocumentError> {
        let mut state = self.state.lock();
        if !state.container_present {
            return Err(DocumentError::ContainerMissing);
        }
        state.summary = Some(*summary);
        state.summary_writes += 1;
        Ok(())
    }

    async fn container_present(&self) -> Result<bool, DocumentError> {
        Ok(self.state.lock().container_present)
    }

    async fn subscribe(&self) -> Result<DocumentEventStream, DocumentError> {
        let (tx, rx) = mpsc::unbounded();
        self.state.lock().subscribers.push(tx);
        Ok(rx.boxed())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
