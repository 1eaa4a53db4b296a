use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CorrelationRequest, CorrelationResponse};
use crate::service::PredictionService;

/// Correlate daily litter counts with the weather
#[utoipa::path(
    post,
    path = "/api/correlation/analyze",
    request_body = CorrelationRequest,
    responses(
        (status = 200, description = "Correlation computed", body = CorrelationResponse),
        (status = 400, description = "Invalid window or date")
    )
)]
pub async fn analyze_correlation(
    Extension(service): Extension<Arc<PredictionService>>,
    Json(request): Json<CorrelationRequest>,
) -> Result<(StatusCode, Json<CorrelationResponse>)> {
    let analysis = service.analyze_correlation(&request)?;
    Ok((StatusCode::OK, Json(analysis)))
}
