// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 加载器（loader）：滚动页面直到评论达到目标数量
/// - 提取器（extractor）：按文档顺序读取评论文本
/// - 评分器（rater）：整批调用远程评分服务
/// - 标注器（annotator）：幂等地写回徽章与汇总
/// - 流水线（pipeline）：串联以上服务，保证同一时刻只有一个周期
pub mod annotator;
pub mod extractor;
pub mod loader;
pub mod pipeline;
pub mod rater;
