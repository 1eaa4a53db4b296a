use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::correlation::DailyWeather;
use crate::features::TrashItem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    /// Day to predict, `YYYY-MM-DD`.
    pub date: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Expected temperature in °C; the seasonal value is used when absent.
    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub weather_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorrelationRequest {
    #[serde(default)]
    pub trash_items: Vec<TrashItem>,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    #[serde(default = "default_days_back")]
    pub days_back: u32,

    /// Window ends the day before this date (`YYYY-MM-DD`); today when absent.
    #[serde(default)]
    pub reference_date: Option<String>,

    /// Daily weather for the window; a seasonal series is generated when absent.
    #[serde(default)]
    pub weather: Option<Vec<DailyWeather>>,
}

fn default_latitude() -> f64 {
    51.5912
}

fn default_longitude() -> f64 {
    4.7761
}

fn default_days_back() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_request_optional_fields() {
        let req: PredictionRequest = serde_json::from_str(r#"{"date":"2025-07-01"}"#).unwrap();
        assert_eq!(req.date, "2025-07-01");
        assert!(req.latitude.is_none());
        assert!(req.weather_description.is_none());
    }

    #[test]
    fn test_correlation_request_defaults() {
        let req: CorrelationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.days_back, 30);
        assert_eq!(req.latitude, 51.5912);
        assert!(req.trash_items.is_empty());
        assert!(req.weather.is_none());
    }
}
