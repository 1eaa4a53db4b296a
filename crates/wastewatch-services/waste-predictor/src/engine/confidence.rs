//! Confidence estimation.
//!
//! A heuristic trust score in `[0, 1]` computed from model internals. Forests
//! score the agreement between their trees; single trees score the leaf the
//! sample lands in. The two scales are not comparable with each other.
//!
//! Every stage returns a typed [`ConfidenceError`]; [`confidence`] walks the
//! fallback chain and always produces a number.

use thiserror::Error;

use super::model::TrainedModel;
use crate::learner::{RandomForest, RegressionTree};

/// Returned for forests when the spread cannot be computed.
pub const FOREST_FALLBACK: f64 = 0.3;
/// Returned when the mean tree prediction is exactly zero.
pub const ZERO_MEAN_CONFIDENCE: f64 = 0.3;
/// Last resort for single trees.
pub const TREE_FALLBACK: f64 = 0.4;

const FOREST_RANGE: (f64, f64) = (0.3, 0.9);
const TREE_RANGE: (f64, f64) = (0.2, 0.9);
const IMPORTANCE_RANGE: (f64, f64) = (0.3, 0.7);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("ensemble has no member predictions")]
    EmptyEnsemble,

    #[error("root node holds no training samples")]
    EmptyRoot,

    #[error("leaf {0} not found")]
    MissingLeaf(usize),

    #[error("non-finite statistic: {0}")]
    NonFinite(&'static str),

    #[error("tree has no feature importances")]
    NoImportances,
}

/// Confidence for one prediction, rounded to 3 decimals. Never fails.
pub fn confidence(model: &TrainedModel, features: &[f64]) -> f64 {
    let score = match model {
        TrainedModel::Forest(forest) => forest_confidence(forest, features).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "forest confidence fell back");
            FOREST_FALLBACK
        }),
        TrainedModel::Tree(tree) => tree_confidence(tree, features),
    };
    (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

/// Agreement between the trees of a forest for one sample.
pub fn forest_confidence(forest: &RandomForest, features: &[f64]) -> Result<f64, ConfidenceError> {
    spread_confidence(&forest.tree_predictions(features))
}

/// `clamp(1 - clamp(std / |mean|, 0, 1), 0.3, 0.9)` over member predictions.
pub fn spread_confidence(predictions: &[f64]) -> Result<f64, ConfidenceError> {
    if predictions.is_empty() {
        return Err(ConfidenceError::EmptyEnsemble);
    }
    let n = predictions.len() as f64;
    let mean = predictions.iter().sum::<f64>() / n;
    if !mean.is_finite() {
        return Err(ConfidenceError::NonFinite("mean"));
    }
    if mean == 0.0 {
        return Ok(ZERO_MEAN_CONFIDENCE);
    }
    let variance = predictions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if !std.is_finite() {
        return Err(ConfidenceError::NonFinite("std"));
    }

    let relative_spread = (std / mean.abs()).clamp(0.0, 1.0);
    Ok((1.0 - relative_spread).clamp(FOREST_RANGE.0, FOREST_RANGE.1))
}

/// Leaf statistics first, then feature importances, then [`TREE_FALLBACK`].
pub fn tree_confidence(tree: &RegressionTree, features: &[f64]) -> f64 {
    leaf_path_confidence(tree, features)
        .or_else(|err| {
            tracing::debug!(error = %err, "leaf confidence unavailable, using importances");
            importance_confidence(tree)
        })
        .unwrap_or_else(|err| {
            tracing::debug!(error = %err, "importance confidence unavailable");
            TREE_FALLBACK
        })
}

/// Score the leaf a sample routes to.
pub fn leaf_path_confidence(tree: &RegressionTree, features: &[f64]) -> Result<f64, ConfidenceError> {
    let visit = tree.apply(features);
    let leaf = tree
        .node_at(visit.node)
        .ok_or(ConfidenceError::MissingLeaf(visit.node))?;
    leaf_confidence(leaf.n_samples, tree.root().n_samples, leaf.impurity, visit.depth)
}

/// Sum of three bounded sub-scores, clamped to `[0.2, 0.9]`:
///
/// - samples: `min(0.6, leaf_samples / root_samples * 5)`
/// - purity: `clamp(1 - impurity, 0.1, 0.4)`
/// - depth: `min(0.2, depth / 10)`
pub fn leaf_confidence(
    leaf_samples: usize,
    root_samples: usize,
    impurity: f64,
    depth: usize,
) -> Result<f64, ConfidenceError> {
    if root_samples == 0 {
        return Err(ConfidenceError::EmptyRoot);
    }
    if !impurity.is_finite() {
        return Err(ConfidenceError::NonFinite("impurity"));
    }

    let sample_ratio = leaf_samples as f64 / root_samples as f64;
    let sample_confidence = (sample_ratio * 5.0).min(0.6);
    let purity_confidence = (1.0 - impurity).clamp(0.1, 0.4);
    let depth_confidence = (depth as f64 / 10.0).min(0.2);

    let total = sample_confidence + purity_confidence + depth_confidence;
    Ok(total.clamp(TREE_RANGE.0, TREE_RANGE.1))
}

/// `clamp(max_importance * 2, 0.3, 0.7)`.
pub fn importance_confidence(tree: &RegressionTree) -> Result<f64, ConfidenceError> {
    let max = tree
        .feature_importances()
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(ConfidenceError::NoImportances)?;
    if !max.is_finite() {
        return Err(ConfidenceError::NonFinite("importance"));
    }
    Ok((max * 2.0).clamp(IMPORTANCE_RANGE.0, IMPORTANCE_RANGE.1))
}
