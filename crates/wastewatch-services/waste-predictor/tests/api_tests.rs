use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use waste_predictor::{
    api::create_routes,
    service::{JsonFileSource, SeasonalWeatherProvider, SyntheticSource},
    Config, PredictionService,
};

fn test_service() -> Arc<PredictionService> {
    let mut config = Config::default();
    config.training.forest_trees = 20;
    let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    Arc::new(PredictionService::new(
        config,
        Box::new(SyntheticSource::new(120, 7, end)),
        Box::new(SeasonalWeatherProvider),
    ))
}

fn app(service: Arc<PredictionService>) -> Router {
    create_routes().layer(axum::Extension(service))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (status, json) = send(app(test_service()), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "waste-predictor");
}

#[tokio::test]
async fn test_api_health_before_training() {
    let (status, json) = send(app(test_service()), "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "starting");
    assert_eq!(json["models_loaded"], false);
    assert_eq!(json["available_targets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_predict_before_training_is_unavailable() {
    let (status, json) = send(
        app(test_service()),
        "POST",
        "/api/predict",
        Some(json!({ "date": "2025-07-01" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "unavailable");
}

#[tokio::test]
async fn test_model_info_before_training_is_unavailable() {
    let (status, _) = send(app(test_service()), "GET", "/api/model-info", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_predict_rejects_malformed_date() {
    let (status, json) = send(
        app(test_service()),
        "POST",
        "/api/predict",
        Some(json!({ "date": "01/07/2025" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_input");
}

#[tokio::test]
async fn test_train_then_predict() {
    let service = test_service();

    let (status, report) = send(app(service.clone()), "POST", "/api/train", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["rows"].as_u64().unwrap() > 100);
    assert_eq!(report["categories"]["Plastic"]["status"], "trained");

    let (status, json) = send(
        app(service.clone()),
        "POST",
        "/api/predict",
        Some(json!({
            "date": "2025-07-05",
            "temperature": 24.0,
            "weather_description": "Sunny"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "2025-07-05");
    assert_eq!(json["weather"]["weather_code"], 0);
    assert_eq!(json["weather"]["source"], "request");

    let predictions = json["predictions"].as_object().unwrap();
    assert_eq!(predictions.len(), 4);
    let mut total = 0;
    for forecast in predictions.values() {
        total += forecast["count"].as_u64().unwrap();
        let confidence = forecast["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }
    assert_eq!(json["total"].as_u64().unwrap(), total);

    let (status, health) = send(app(service), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["models_loaded"], true);
}

#[tokio::test]
async fn test_predict_uses_seasonal_weather_when_missing() {
    let service = test_service();
    service.train().unwrap();

    let (status, json) = send(
        app(service),
        "POST",
        "/api/predict",
        Some(json!({ "date": "2025-01-15", "latitude": 51.58, "longitude": 4.78 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["weather"]["source"], "provider");
    assert_eq!(json["weather"]["temperature"], 5.0);
    assert_eq!(json["location"]["latitude"], 51.58);
}

#[tokio::test]
async fn test_model_info_after_training() {
    let service = test_service();
    service.train().unwrap();

    let (status, json) = send(app(service), "GET", "/api/model-info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["features"].as_array().unwrap().len(), 10);
    assert_eq!(json["features"][0], "latitude");
    assert_eq!(json["targets"].as_array().unwrap().len(), 4);
    assert!(json["weather_types"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w == "Zonnig"));
    assert!(json["trained_at"].is_string());
}

#[tokio::test]
async fn test_correlation_endpoint() {
    let (status, json) = send(
        app(test_service()),
        "POST",
        "/api/correlation/analyze",
        Some(json!({
            "reference_date": "2025-06-01",
            "days_back": 6,
            "trash_items": [
                { "id": "1", "litterType": "Plastic", "latitude": 51.59, "longitude": 4.77, "timestamp": "2025-05-28T10:00:00Z" }
            ],
            "weather": [
                { "date": "2025-05-26", "temperature_max": 14.0, "temperature_min": 6.0, "precipitation": 3.0, "weather_code": 61 },
                { "date": "2025-05-27", "temperature_max": 16.0, "temperature_min": 8.0, "precipitation": 0.0, "weather_code": 0 },
                { "date": "2025-05-28", "temperature_max": 24.0, "temperature_min": 14.0, "precipitation": 0.0, "weather_code": 0 }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["start_date"], "2025-05-25");
    assert_eq!(json["end_date"], "2025-05-31");
    assert_eq!(json["days_analyzed"], 3);
    assert_eq!(
        json["chart_data"]["temperature_data"]["trash_count"],
        json!([0, 0, 1])
    );
}

#[tokio::test]
async fn test_correlation_rejects_empty_window() {
    let (status, _) = send(
        app(test_service()),
        "POST",
        "/api/correlation/analyze",
        Some(json!({ "days_back": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_data_file_degrades_to_none() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(PredictionService::new(
        Config::default(),
        Box::new(JsonFileSource::new(dir.path().join("trash.json"), None)),
        Box::new(SeasonalWeatherProvider),
    ));

    let (status, json) = send(app(service.clone()), "POST", "/api/train", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "unavailable");

    let (status, json) = send(
        app(service),
        "POST",
        "/api/predict",
        Some(json!({ "date": "2025-07-05" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
    assert_eq!(json["model_type"], "mixed");
    for forecast in json["predictions"].as_object().unwrap().values() {
        assert_eq!(forecast["count"], 0);
        assert_eq!(forecast["confidence"], 0.0);
        assert_eq!(forecast["model_used"], "none");
    }
}
