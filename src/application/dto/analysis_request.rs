// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 启动分析请求
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct StartAnalysisDto {
    /// 目标评论数，缺省时使用配置中的默认值
    #[validate(range(min = 1))]
    pub target_count: Option<u32>,
}
