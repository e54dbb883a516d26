// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含分析用例和请求 DTO
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含评论、评分等核心模型，以及加载、提取、评分、标注和流水线服务
pub mod domain;

/// 引擎模块
///
/// 实现评论页面能力：基于 Chromium 的真实页面和内存页面
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出等技术实现
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 工具模块
///
/// 提供错误类型、重试策略、日志初始化和 CSV 导出
pub mod utils;

/// 工作器模块
///
/// 实现页面观察器和流水线触发工作器
pub mod workers;
