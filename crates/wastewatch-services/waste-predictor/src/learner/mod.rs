//! Regression learners used by the prediction engine.
//!
//! A CART regression tree, a bagged forest of them, the scores used to
//! compare the two, and a seeded train/test splitter.

pub mod forest;
pub mod metrics;
pub mod split;
pub mod tree;

use thiserror::Error;

pub use forest::{ForestParams, RandomForest};
pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
pub use split::{take_rows, train_test_split, TrainTestSplit};
pub use tree::{LeafVisit, RegressionTree, Split, TreeNode, TreeParams};

/// Errors raised while fitting or assembling a learner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LearnerError {
    #[error("no training samples")]
    EmptyInput,

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("training data contains NaN or infinite values")]
    NonFinite,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid model structure: {0}")]
    InvalidStructure(String),
}
