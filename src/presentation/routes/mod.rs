// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::analysis_use_case::AnalysisController;
use crate::presentation::handlers::analysis_handler;
use axum::{extract::Extension, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `controller` - 分析控制器，通过 Extension 注入各处理器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(controller: Arc<AnalysisController>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let analysis_routes = Router::new()
        .route(
            "/v1/analysis",
            get(analysis_handler::get_analysis)
                .post(analysis_handler::start_analysis)
                .delete(analysis_handler::cancel_analysis),
        )
        .route("/v1/analysis/export", get(analysis_handler::export_analysis))
        .layer(Extension(controller));

    Router::new()
        .merge(public_routes)
        .merge(analysis_routes)
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
