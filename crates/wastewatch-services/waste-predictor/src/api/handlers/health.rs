use axum::{http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::HealthResponse;
use crate::service::PredictionService;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive")
    )
)]
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "waste-predictor",
        })),
    )
}

/// Model readiness
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Readiness and loaded targets", body = HealthResponse)
    )
)]
pub async fn api_health(
    Extension(service): Extension<Arc<PredictionService>>,
) -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(service.health()))
}
