//! Per-category model selection and confidence scoring.
//!
//! The [`Trainer`] fits a decision tree and a random forest per waste
//! category and publishes them as an immutable [`ModelRegistry`]. At request
//! time the [`PredictionEngine`] picks the higher-scoring model per category
//! and attaches a heuristic confidence.

pub mod confidence;
pub mod model;
pub mod predictor;
pub mod registry;
pub mod selector;
pub mod trainer;

pub use confidence::{confidence, ConfidenceError};
pub use model::{ModelKind, ModelKindUsed, OverallKind, TrainedModel};
pub use predictor::{CategoryPrediction, Prediction, PredictionEngine, PredictionInput};
pub use registry::{CategoryModels, ModelInfo, ModelRegistry, RegistryHandle, ScoredModel};
pub use selector::{select_model, Selection, DEFAULT_KIND};
pub use trainer::{
    CategoryFailure, CategoryStatus, Trainer, TrainerConfig, TrainingError, TrainingOutcome,
    TrainingReport, TrainingRun,
};
