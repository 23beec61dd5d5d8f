use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use ytlens_insight::{AnalysisResult, ChartInsight, Comment, InsightError, MetricBundle};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CommentAnalysisRequest {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartAnalysisRequest {
    pub chart_type: String,
    /// Metric values; keys the task's template does not reference are ignored.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChartAnalysis {
    analysis: String,
}

pub(super) async fn analyze_comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CommentAnalysisRequest>,
) -> Json<ApiResponse<AnalysisResult>> {
    tracing::info!(comments = body.comments.len(), "comment analysis requested");
    let data = state.engine.analyze_comments(&body.comments).await;

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn analyze_chart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ChartAnalysisRequest>,
) -> Result<Json<ApiResponse<ChartAnalysis>>, ApiError> {
    tracing::info!(chart_type = %body.chart_type, "chart analysis requested");
    let bundle = MetricBundle::from_json(&body.chart_type, &body.data)
        .map_err(|e| map_insight_error(req_id.0.clone(), &e))?;

    match state.engine.analyze_chart(&bundle).await {
        Ok(ChartInsight::Insight(analysis)) => Ok(Json(ApiResponse {
            data: ChartAnalysis { analysis },
            meta: ResponseMeta::new(req_id.0),
        })),
        Ok(ChartInsight::Unavailable { reason }) => {
            tracing::warn!(task = %bundle.task, reason = %reason, "chart analysis failed");
            Err(ApiError::new(
                req_id.0,
                "analysis_failed",
                "chart insight is unavailable",
            ))
        }
        Err(e) => Err(map_insight_error(req_id.0, &e)),
    }
}

fn map_insight_error(request_id: String, error: &InsightError) -> ApiError {
    if error.is_invalid_request() {
        return ApiError::new(request_id, "bad_request", error.to_string());
    }
    tracing::error!(error = %error, "chart analysis errored");
    ApiError::new(request_id, "internal_error", "chart analysis errored")
}
