use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::engine::{ModelKindUsed, OverallKind};
use crate::service::WeatherSource;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeatherUsed {
    pub temperature: f64,
    pub description: String,
    pub weather_code: u8,
    pub source: WeatherSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryForecast {
    pub count: u32,
    pub confidence: f64,
    pub model_used: ModelKindUsed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_tree_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub date: String,
    pub location: Location,
    pub weather: WeatherUsed,
    /// Keyed by category name.
    pub predictions: BTreeMap<String, CategoryForecast>,
    pub total: u32,
    pub average_confidence: f64,
    pub average_r2: f64,
    pub model_type: OverallKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_skipped() {
        let forecast = CategoryForecast {
            count: 0,
            confidence: 0.0,
            model_used: ModelKindUsed::None,
            r2: None,
            decision_tree_confidence: None,
            random_forest_confidence: None,
        };
        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["model_used"], "none");
        assert!(json.get("r2").is_none());
    }
}
