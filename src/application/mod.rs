// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含分析用例与请求 DTO，把领域流水线暴露给控制接口和后台工作器
pub mod dto;
pub mod use_cases;
