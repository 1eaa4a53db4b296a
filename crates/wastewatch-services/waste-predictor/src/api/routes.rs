use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::api_health,
        handlers::predict_waste,
        handlers::model_info,
        handlers::train_models,
        handlers::analyze_correlation,
    ),
    components(schemas(
        crate::models::PredictionRequest,
        crate::models::PredictionResponse,
        crate::models::CategoryForecast,
        crate::models::Location,
        crate::models::WeatherUsed,
        crate::models::ModelInfoResponse,
        crate::models::KindScores,
        crate::models::HealthResponse,
        crate::models::TrainingReportResponse,
        crate::models::CategoryTrainingResult,
        crate::models::CorrelationRequest,
        crate::models::CorrelationResponse,
        crate::models::CorrelationStrength,
        crate::models::DailyWeather,
        crate::models::ChartData,
        crate::models::TemperatureSeries,
        crate::models::WeatherDistribution,
        crate::models::CorrelationScatter,
        crate::features::TrashItem,
        crate::engine::ModelKind,
        crate::engine::ModelKindUsed,
        crate::engine::OverallKind,
        crate::engine::TrainingOutcome,
        crate::service::WeatherSource,
    )),
    tags(
        (name = "waste-predictor", description = "Litter prediction and weather correlation API")
    ),
    info(
        title = "Waste Predictor API",
        version = "0.1.0",
        description = "Per-category litter forecasts from decision tree and random forest models"
    )
)]
pub struct ApiDoc;

pub fn create_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        .route("/api/predict", post(handlers::predict_waste))
        .route("/api/model-info", get(handlers::model_info))
        .route("/api/train", post(handlers::train_models))
        .route(
            "/api/correlation/analyze",
            post(handlers::analyze_correlation),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
