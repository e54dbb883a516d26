// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rating::RatingResult;
use crate::engines::traits::NodeHandle;
use serde::{Deserialize, Serialize};

/// 评论记录
///
/// 由提取器在观察到节点时创建。`rated` 只会从 false 变为 true 一次，
/// 真正的幂等保证来自页面节点上的评分标记。
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    /// 页面节点句柄（借用自页面后端）
    pub handle: NodeHandle,
    /// 裁剪后的评论文本
    pub text: String,
    /// 是否已标注
    pub rated: bool,
}

impl CommentRecord {
    pub fn new(handle: NodeHandle, text: impl Into<String>) -> Self {
        Self {
            handle,
            text: text.into(),
            rated: false,
        }
    }
}

/// 导出表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedComment {
    pub text: String,
    pub quality: f64,
    pub difficulty: f64,
}

impl RatedComment {
    pub fn new(text: impl Into<String>, rating: &RatingResult) -> Self {
        Self {
            text: text.into(),
            quality: rating.quality,
            difficulty: rating.difficulty,
        }
    }
}
