use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::error::{Result, WasteError};
use crate::models::TrainingReportResponse;
use crate::service::PredictionService;

/// Retrain every category
#[utoipa::path(
    post,
    path = "/api/train",
    responses(
        (status = 200, description = "Training finished", body = TrainingReportResponse),
        (status = 409, description = "A training pass is already running"),
        (status = 503, description = "No usable data or no category trained")
    )
)]
pub async fn train_models(
    Extension(service): Extension<Arc<PredictionService>>,
) -> Result<(StatusCode, Json<TrainingReportResponse>)> {
    let report = tokio::task::spawn_blocking(move || service.train())
        .await
        .map_err(|e| WasteError::internal(format!("training task failed: {}", e)))??;
    Ok((StatusCode::OK, Json(report)))
}
