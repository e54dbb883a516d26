// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 分析周期总数（标签：trigger、outcome）
pub const CYCLES_TOTAL: &str = "commentrs_cycles_total";
/// 评分服务请求总数（标签：outcome）
pub const RATER_REQUESTS_TOTAL: &str = "commentrs_rater_requests_total";
/// 写入页面的徽章总数
pub const BADGES_TOTAL: &str = "commentrs_badges_total";
/// 最近一次加载结束时的评论数
pub const LOADED_COMMENTS: &str = "commentrs_loaded_comments";
/// 评分请求耗时
pub const RATER_LATENCY_SECONDS: &str = "commentrs_rater_latency_seconds";

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册应用的各类指标
pub fn init_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    let addr: SocketAddr = settings
        .address
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", settings.address))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        CYCLES_TOTAL,
        "Total number of analysis cycles by trigger and outcome"
    );
    describe_counter!(
        RATER_REQUESTS_TOTAL,
        "Total number of rating service requests by outcome"
    );
    describe_counter!(BADGES_TOTAL, "Total number of rating badges written");
    describe_gauge!(
        LOADED_COMMENTS,
        "Number of loaded comments at the end of the last load"
    );
    describe_histogram!(
        RATER_LATENCY_SECONDS,
        "Duration of rating service requests in seconds"
    );
}
