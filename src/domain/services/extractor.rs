// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::comment::CommentRecord;
use crate::engines::traits::{CommentDocument, DocumentError};

/// 读取页面当前的评论
///
/// 纯读取：不访问网络，不修改页面。结果保持文档顺序，
/// 空白评论被丢弃，文本首尾空白被裁剪。
pub async fn extract_comments(
    document: &dyn CommentDocument,
) -> Result<Vec<CommentRecord>, DocumentError> {
    let nodes = document.comment_nodes().await?;

    Ok(nodes
        .into_iter()
        .filter_map(|node| {
            let text = node.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(CommentRecord {
                handle: node.handle,
                text: text.to_string(),
                rated: node.rated,
            })
        })
        .collect())
}

/// 只保留尚未标注的评论
pub fn unrated(records: Vec<CommentRecord>) -> Vec<CommentRecord> {
    records.into_iter().filter(|r| !r.rated).collect()
}
