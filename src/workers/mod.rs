// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台任务：页面观察器、流水线触发工作器以及它们的生命周期管理
pub mod manager;
pub mod trigger_worker;
pub mod watcher;
pub mod worker;

pub use worker::Worker;
