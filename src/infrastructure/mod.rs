// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供与具体技术相关的实现。目前包含指标（metrics）：
/// Prometheus 导出器的安装以及应用各项指标的名称与描述。
pub mod metrics;
