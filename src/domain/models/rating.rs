// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条评论的评分结果
///
/// 评分服务按请求顺序返回，第 i 个结果对应第 i 条评论。
/// 取值预期范围为 1-5，但不在此处强制。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    /// 内容质量
    pub quality: f64,
    /// 理解难度
    pub difficulty: f64,
}

impl RatingResult {
    pub fn new(quality: f64, difficulty: f64) -> Self {
        Self {
            quality,
            difficulty,
        }
    }

    /// 徽章上显示的文本
    pub fn badge_label(&self) -> String {
        format!("Q {:.1} · D {:.1}", self.quality, self.difficulty)
    }
}

/// 当前结果集的汇总
///
/// 每个周期整体替换写入页面的汇总区域，不做累加
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// 参与汇总的评论数
    pub count: usize,
    /// 平均质量
    pub mean_quality: f64,
    /// 平均难度
    pub mean_difficulty: f64,
}

impl RatingSummary {
    /// 计算结果集的平均值，空结果集返回 None
    pub fn from_results(results: &[RatingResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let count = results.len();
        let (quality_sum, difficulty_sum) = results
            .iter()
            .fold((0.0, 0.0), |(q, d), r| (q + r.quality, d + r.difficulty));

        Some(Self {
            count,
            mean_quality: quality_sum / count as f64,
            mean_difficulty: difficulty_sum / count as f64,
        })
    }
}

impl fmt::Display for RatingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average quality: {:.1} · Average difficulty: {:.1} ({} comments)",
            self.mean_quality, self.mean_difficulty, self.count
        )
    }
}
