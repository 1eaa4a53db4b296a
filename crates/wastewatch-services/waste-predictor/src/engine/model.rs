use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::learner::{RandomForest, RegressionTree};

/// The two regressor families trained per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum ModelKind {
    #[serde(rename = "decision_tree")]
    Tree,
    #[serde(rename = "random_forest")]
    Forest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Tree, ModelKind::Forest];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Tree => "decision_tree",
            ModelKind::Forest => "random_forest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which model answered for a category, `None` when the category has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ModelKindUsed {
    #[serde(rename = "decision_tree")]
    Tree,
    #[serde(rename = "random_forest")]
    Forest,
    #[serde(rename = "none")]
    None,
}

impl From<ModelKind> for ModelKindUsed {
    fn from(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Tree => ModelKindUsed::Tree,
            ModelKind::Forest => ModelKindUsed::Forest,
        }
    }
}

/// Summary of the kinds used across one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OverallKind {
    #[serde(rename = "decision_tree")]
    Tree,
    #[serde(rename = "random_forest")]
    Forest,
    #[serde(rename = "mixed")]
    Mixed,
}

/// A fitted model tagged with its kind. Immutable once trained.
#[derive(Debug, Clone)]
pub enum TrainedModel {
    Tree(RegressionTree),
    Forest(RandomForest),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Tree(_) => ModelKind::Tree,
            TrainedModel::Forest(_) => ModelKind::Forest,
        }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        match self {
            TrainedModel::Tree(tree) => tree.predict(features),
            TrainedModel::Forest(forest) => forest.predict(features),
        }
    }

    pub fn predict_batch<R: AsRef<[f64]>>(&self, samples: &[R]) -> Vec<f64> {
        match self {
            TrainedModel::Tree(tree) => tree.predict_batch(samples),
            TrainedModel::Forest(forest) => forest.predict_batch(samples),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            TrainedModel::Tree(tree) => tree.n_features(),
            TrainedModel::Forest(forest) => forest.n_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::TreeParams;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ModelKind::Tree).unwrap(),
            "\"decision_tree\""
        );
        assert_eq!(
            serde_json::to_string(&ModelKindUsed::None).unwrap(),
            "\"none\""
        );
        assert_eq!(
            serde_json::to_string(&OverallKind::Mixed).unwrap(),
            "\"mixed\""
        );
        assert_eq!(ModelKind::Forest.to_string(), "random_forest");
    }

    #[test]
    fn test_trained_model_dispatch() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![1.0, 1.0, 5.0, 5.0];
        let tree = RegressionTree::fit(&x, &y, &TreeParams::with_max_depth(1), 1).unwrap();
        let model = TrainedModel::Tree(tree);

        assert_eq!(model.kind(), ModelKind::Tree);
        assert_eq!(model.predict(&[0.5]), 1.0);
        assert_eq!(model.predict_batch(&x), y);
        assert_eq!(model.n_features(), 1);
    }
}
