use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{ModelInfoResponse, PredictionRequest, PredictionResponse};
use crate::service::PredictionService;

/// Predict litter counts per category
#[utoipa::path(
    post,
    path = "/api/predict",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Prediction generated", body = PredictionResponse),
        (status = 400, description = "Malformed date or parameters"),
        (status = 503, description = "Models not loaded yet")
    )
)]
pub async fn predict_waste(
    Extension(service): Extension<Arc<PredictionService>>,
    Json(request): Json<PredictionRequest>,
) -> Result<(StatusCode, Json<PredictionResponse>)> {
    let prediction = service.predict(&request)?;
    Ok((StatusCode::OK, Json(prediction)))
}

/// Scores and inputs of the loaded models
#[utoipa::path(
    get,
    path = "/api/model-info",
    responses(
        (status = 200, description = "Model information", body = ModelInfoResponse),
        (status = 503, description = "Models not loaded yet")
    )
)]
pub async fn model_info(
    Extension(service): Extension<Arc<PredictionService>>,
) -> Result<(StatusCode, Json<ModelInfoResponse>)> {
    Ok((StatusCode::OK, Json(service.model_info()?)))
}
