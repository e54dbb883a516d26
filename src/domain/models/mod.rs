// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 评论记录（comment）：页面评论及导出表行
/// - 评分（rating）：单条评分与汇总
/// - 分析（analysis）：加载进度、周期报告与分析状态
pub mod analysis;
pub mod comment;
pub mod rating;
