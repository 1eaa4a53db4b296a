//! Per-category model training.
//!
//! One deterministic train/test split is shared by every category. Each
//! category with variance in its counts gets a decision tree and a random
//! forest, scored by held-out R² clamped at zero. A failure in one category
//! or one model kind is recorded and the pass continues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

use super::confidence::confidence;
use super::model::{ModelKind, TrainedModel};
use super::registry::{CategoryModels, ModelRegistry, ScoredModel};
use crate::features::{Category, FeatureTable, FEATURE_COUNT};
use crate::learner::{
    r2_score, take_rows, train_test_split, ForestParams, LearnerError, RandomForest,
    RegressionTree, TreeParams,
};

/// Test rows used for the diagnostic confidence average.
const CONFIDENCE_SAMPLE_ROWS: usize = 10;

/// Knobs for one training pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub test_ratio: f64,
    pub split_seed: u64,
    pub model_seed: u64,
    pub min_training_rows: usize,
    pub tree: TreeParams,
    pub forest: ForestParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.3,
            split_seed: 42,
            model_seed: 42,
            min_training_rows: 5,
            tree: TreeParams::with_max_depth(2),
            forest: ForestParams::default(),
        }
    }
}

/// Why a category produced no model (or only one).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CategoryFailure {
    #[error("counts have zero variance")]
    ZeroVariance,

    #[error("{kind} fit failed: {source}")]
    Fit {
        kind: ModelKind,
        #[source]
        source: LearnerError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryStatus {
    /// At least one kind trained. Scores are `None` for a kind that failed.
    Trained {
        tree_r2: Option<f64>,
        forest_r2: Option<f64>,
        tree_confidence: Option<f64>,
        forest_confidence: Option<f64>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        reason: String,
    },
}

impl CategoryStatus {
    pub fn is_trained(&self) -> bool {
        matches!(self, CategoryStatus::Trained { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrainingOutcome {
    /// Every category trained.
    Success,
    /// Some categories trained, others were skipped or failed.
    PartialFailure,
    /// No category trained.
    TotalFailure,
}

/// What a training pass did, per category.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub outcome: TrainingOutcome,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub categories: BTreeMap<Category, CategoryStatus>,
    pub finished_at: DateTime<Utc>,
}

impl TrainingReport {
    pub fn trained_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|(_, status)| status.is_trained())
            .map(|(category, _)| *category)
            .collect()
    }

    pub fn summary(&self) -> String {
        let trained = self.trained_categories().len();
        format!(
            "{} of {} categories trained on {} rows",
            trained,
            self.categories.len(),
            self.rows
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    #[error("training data unavailable: {rows} usable rows, need at least {required}")]
    TrainingDataUnavailable { rows: usize, required: usize },

    #[error("no category could be trained ({})", .report.summary())]
    NoCategoryTrained { report: Box<TrainingReport> },
}

/// A finished pass: the new registry plus its report.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub registry: ModelRegistry,
    pub report: TrainingReport,
}

struct Partition<'a> {
    x_train: &'a [[f64; FEATURE_COUNT]],
    y_train: &'a [f64],
    x_test: &'a [[f64; FEATURE_COUNT]],
    y_test: &'a [f64],
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train every category on `table`.
    ///
    /// # Errors
    ///
    /// `TrainingDataUnavailable` when the table has fewer than
    /// `min_training_rows` rows; `NoCategoryTrained` when every category was
    /// skipped or failed.
    pub fn train(&self, table: &FeatureTable) -> Result<TrainingRun, TrainingError> {
        let rows = table.len();
        let required = self.config.min_training_rows.max(1);
        if rows < required {
            tracing::warn!(rows, required, "not enough rows to train");
            return Err(TrainingError::TrainingDataUnavailable { rows, required });
        }

        let x = table.feature_matrix();
        let split = train_test_split(rows, self.config.test_ratio, self.config.split_seed);
        let x_train = take_rows(&x, &split.train);
        let x_test = take_rows(&x, &split.test);

        tracing::info!(
            rows,
            train_rows = split.train.len(),
            test_rows = split.test.len(),
            "training started"
        );

        let mut models = BTreeMap::new();
        let mut statuses = BTreeMap::new();

        for category in Category::ALL {
            let y = table.targets(category);
            if std_dev(&y) <= 0.0 {
                tracing::warn!(category = %category, "skipping category: {}", CategoryFailure::ZeroVariance);
                statuses.insert(
                    category,
                    CategoryStatus::Skipped {
                        reason: CategoryFailure::ZeroVariance.to_string(),
                    },
                );
                continue;
            }

            let y_train = take_rows(&y, &split.train);
            let y_test = take_rows(&y, &split.test);
            let partition = Partition {
                x_train: &x_train,
                y_train: &y_train,
                x_test: &x_test,
                y_test: &y_test,
            };

            let (category_models, status) = self.train_category(category, &partition);
            if !category_models.is_empty() {
                models.insert(category, category_models);
            }
            statuses.insert(category, status);
        }

        let trained = statuses.values().filter(|s| s.is_trained()).count();
        let outcome = match trained {
            0 => TrainingOutcome::TotalFailure,
            n if n == statuses.len() => TrainingOutcome::Success,
            _ => TrainingOutcome::PartialFailure,
        };

        let finished_at = Utc::now();
        let report = TrainingReport {
            outcome,
            rows,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            categories: statuses,
            finished_at,
        };

        if outcome == TrainingOutcome::TotalFailure {
            tracing::warn!("training produced no models");
            return Err(TrainingError::NoCategoryTrained {
                report: Box::new(report),
            });
        }

        tracing::info!(outcome = ?outcome, trained, "training finished");
        Ok(TrainingRun {
            registry: ModelRegistry::new(models, finished_at),
            report,
        })
    }

    fn train_category(
        &self,
        category: Category,
        partition: &Partition<'_>,
    ) -> (CategoryModels, CategoryStatus) {
        let mut models = CategoryModels::default();
        let mut failures = Vec::new();

        for kind in ModelKind::ALL {
            match self.fit_scored(kind, partition) {
                Ok(scored) => {
                    tracing::info!(category = %category, kind = %kind, r2 = scored.r2, "model trained");
                    match kind {
                        ModelKind::Tree => models.tree = Some(scored),
                        ModelKind::Forest => models.forest = Some(scored),
                    }
                }
                Err(failure) => {
                    tracing::warn!(category = %category, error = %failure, "model fit failed");
                    failures.push(failure.to_string());
                }
            }
        }

        if models.is_empty() {
            return (
                models,
                CategoryStatus::Failed {
                    reason: failures.join("; "),
                },
            );
        }

        let sample = &partition.x_test[..partition.x_test.len().min(CONFIDENCE_SAMPLE_ROWS)];
        let average_confidence = |scored: &ScoredModel| -> Option<f64> {
            if sample.is_empty() {
                return None;
            }
            let sum: f64 = sample.iter().map(|row| confidence(&scored.model, row)).sum();
            Some(sum / sample.len() as f64)
        };

        let status = CategoryStatus::Trained {
            tree_r2: models.score(ModelKind::Tree),
            forest_r2: models.score(ModelKind::Forest),
            tree_confidence: models.tree.as_ref().and_then(average_confidence),
            forest_confidence: models.forest.as_ref().and_then(average_confidence),
        };
        (models, status)
    }

    fn fit_scored(
        &self,
        kind: ModelKind,
        partition: &Partition<'_>,
    ) -> Result<ScoredModel, CategoryFailure> {
        let seed = self.config.model_seed;
        let fitted = match kind {
            ModelKind::Tree => {
                RegressionTree::fit(partition.x_train, partition.y_train, &self.config.tree, seed)
                    .map(TrainedModel::Tree)
            }
            ModelKind::Forest => {
                RandomForest::fit(partition.x_train, partition.y_train, &self.config.forest, seed)
                    .map(TrainedModel::Forest)
            }
        };
        let model = fitted.map_err(|source| CategoryFailure::Fit { kind, source })?;

        let predicted = model.predict_batch(partition.x_test);
        let r2 = r2_score(&predicted, partition.y_test).max(0.0);
        Ok(ScoredModel { model, r2 })
    }
}

/// Population standard deviation; zero for fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
