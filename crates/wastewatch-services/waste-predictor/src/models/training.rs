use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::engine::{CategoryStatus, TrainingOutcome, TrainingReport};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryTrainingResult {
    /// `trained`, `skipped` or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_tree_r2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest_r2: Option<f64>,
    /// Mean confidence over the first test rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_tree_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainingReportResponse {
    pub outcome: TrainingOutcome,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub categories: BTreeMap<String, CategoryTrainingResult>,
    pub finished_at: DateTime<Utc>,
}

impl From<&CategoryStatus> for CategoryTrainingResult {
    fn from(status: &CategoryStatus) -> Self {
        match status {
            CategoryStatus::Trained {
                tree_r2,
                forest_r2,
                tree_confidence,
                forest_confidence,
            } => Self {
                status: "trained".to_string(),
                reason: None,
                decision_tree_r2: *tree_r2,
                random_forest_r2: *forest_r2,
                decision_tree_confidence: *tree_confidence,
                random_forest_confidence: *forest_confidence,
            },
            CategoryStatus::Skipped { reason } => Self::without_scores("skipped", reason),
            CategoryStatus::Failed { reason } => Self::without_scores("failed", reason),
        }
    }
}

impl CategoryTrainingResult {
    fn without_scores(status: &str, reason: &str) -> Self {
        Self {
            status: status.to_string(),
            reason: Some(reason.to_string()),
            decision_tree_r2: None,
            random_forest_r2: None,
            decision_tree_confidence: None,
            random_forest_confidence: None,
        }
    }
}

impl From<&TrainingReport> for TrainingReportResponse {
    fn from(report: &TrainingReport) -> Self {
        Self {
            outcome: report.outcome,
            rows: report.rows,
            train_rows: report.train_rows,
            test_rows: report.test_rows,
            categories: report
                .categories
                .iter()
                .map(|(category, status)| (category.to_string(), status.into()))
                .collect(),
            finished_at: report.finished_at,
        }
    }
}
