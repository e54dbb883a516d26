// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：评论、评分与分析状态
/// - 服务（services）：加载、提取、评分、标注以及组合它们的流水线
///
/// 领域层只通过 `CommentDocument` 特质访问页面，
/// 不依赖任何具体的浏览器实现。
pub mod models;
pub mod services;
