// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    application::{
        dto::analysis_request::StartAnalysisDto,
        use_cases::analysis_use_case::{AnalysisController, AnalysisUseCaseError},
    },
    presentation::errors::AppError,
};

/// 启动分析
pub async fn start_analysis(
    Extension(controller): Extension<Arc<AnalysisController>>,
    Json(payload): Json<StartAnalysisDto>,
) -> Result<impl IntoResponse, AppError> {
    let status = controller.start(payload)?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// 获取分析状态
pub async fn get_analysis(
    Extension(controller): Extension<Arc<AnalysisController>>,
) -> impl IntoResponse {
    Json(controller.status())
}

/// 取消正在执行的分析
pub async fn cancel_analysis(
    Extension(controller): Extension<Arc<AnalysisController>>,
) -> Result<impl IntoResponse, AppError> {
    let status = controller.cancel()?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// 导出最近一个周期的评分表
pub async fn export_analysis(
    Extension(controller): Extension<Arc<AnalysisController>>,
) -> impl IntoResponse {
    match controller.export_csv() {
        Some(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No completed analysis to export" })),
        )
            .into_response(),
    }
}

impl From<AnalysisUseCaseError> for (StatusCode, String) {
    fn from(err: AnalysisUseCaseError) -> Self {
        let status = match err {
            AnalysisUseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AnalysisUseCaseError::AlreadyRunning => StatusCode::CONFLICT,
            AnalysisUseCaseError::NotRunning => StatusCode::NOT_FOUND,
        };
        (status, err.to_string())
    }
}
