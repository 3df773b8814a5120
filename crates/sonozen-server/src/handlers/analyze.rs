use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sonozen_core::{AnalysisError, AnalyzeRequest, AnalyzeResponse};

use crate::state::AppState;

/// 分析错误 → `{ success: false, error }` 响应
#[derive(Debug)]
pub struct ApiError(pub AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(AnalyzeResponse::from(&self.0))).into_response()
    }
}

/// 睡眠分析处理器
///
/// 请求体无法解析（非 JSON、message 类型错误）同样按校验错误返回 400
pub async fn analyze_sleep_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!("Rejected analyze body: {}", rejection.body_text());
        AnalysisError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let message = req.message.as_deref().unwrap_or_default();

    match state.analyzer.analyze(message).await {
        Ok(record) => {
            tracing::info!("Analysis {} completed", record.id);
            Ok(Json(AnalyzeResponse::ok(record)))
        }
        Err(e) => {
            match &e {
                AnalysisError::Validation(_) => tracing::debug!("Analysis rejected: {}", e),
                _ => tracing::error!("Analysis failed ({}): {}", e.kind(), e),
            }
            Err(ApiError(e))
        }
    }
}
