use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::engine::ModelKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct KindScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_tree: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelInfoResponse {
    pub best_model_type: Option<ModelKind>,
    /// Held-out R² per category and kind.
    pub scores: BTreeMap<String, KindScores>,
    pub average_r2: KindScores,
    /// Model inputs, in training order.
    pub features: Vec<String>,
    pub weather_types: Vec<String>,
    pub targets: Vec<String>,
    pub trained_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` once models are loaded, `starting` before.
    pub status: String,
    pub models_loaded: bool,
    pub training: bool,
    pub available_targets: Vec<String>,
    pub api_version: String,
}
