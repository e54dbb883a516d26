// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::use_cases::analysis_use_case::AnalysisUseCaseError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.0.downcast::<AnalysisUseCaseError>() {
            Ok(err) => err.into(),
            Err(other) => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_errors_map_to_status() {
        let conflict = AppError::from(AnalysisUseCaseError::AlreadyRunning).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing = AppError::from(AnalysisUseCaseError::NotRunning).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid =
            AppError::from(AnalysisUseCaseError::ValidationError("bad".into())).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let response = AppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
