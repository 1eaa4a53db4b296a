//! Bagged ensemble of regression trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::tree::{validate_training_data, RegressionTree, TreeParams};
use super::LearnerError;

/// Hyperparameters for a random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows.
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 1000,
            tree: TreeParams::with_max_depth(5),
            bootstrap: true,
        }
    }
}

/// A fitted random forest; the prediction is the mean of its trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit `n_estimators` trees, each on its own bootstrap sample.
    ///
    /// Every tree draws its own seed from a ChaCha stream seeded with `seed`,
    /// so the ensemble is reproducible.
    pub fn fit<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, LearnerError> {
        if params.n_estimators == 0 {
            return Err(LearnerError::InvalidParameter(
                "n_estimators must be at least 1".into(),
            ));
        }
        let n_features = validate_training_data(x, y)?;
        params.tree.validate(n_features)?;

        let mut seeds = ChaCha8Rng::seed_from_u64(seed);
        let n = x.len();
        let trees = (0..params.n_estimators)
            .map(|_| {
                let mut rng = ChaCha8Rng::seed_from_u64(seeds.gen());
                let indices: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit_rows(x, y, indices, n_features, &params.tree, &mut rng)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    /// Assemble a forest from already fitted trees.
    pub fn from_trees(trees: Vec<RegressionTree>) -> Result<Self, LearnerError> {
        let Some(first) = trees.first() else {
            return Err(LearnerError::InvalidStructure("forest has no trees".into()));
        };
        let n_features = first.n_features();
        if let Some(bad) = trees.iter().find(|t| t.n_features() != n_features) {
            return Err(LearnerError::DimensionMismatch {
                expected: n_features,
                found: bad.n_features(),
            });
        }
        Ok(Self { trees, n_features })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict_batch<R: AsRef<[f64]>>(&self, samples: &[R]) -> Vec<f64> {
        samples.iter().map(|s| self.predict(s.as_ref())).collect()
    }

    /// Per-tree predictions, in tree order.
    pub fn tree_predictions(&self, features: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|t| t.predict(features)).collect()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean of the per-tree importances.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, value) in total.iter_mut().zip(tree.feature_importances()) {
                *acc += value;
            }
        }
        let n = self.trees.len() as f64;
        total.iter_mut().for_each(|v| *v /= n);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_line() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y: Vec<f64> = (0..50)
            .map(|i| i as f64 * 0.5 + ((i * 13) % 5) as f64 * 0.1)
            .collect();
        (x, y)
    }

    fn small_params(n: usize) -> ForestParams {
        ForestParams {
            n_estimators: n,
            tree: TreeParams::with_max_depth(4),
            bootstrap: true,
        }
    }

    #[test]
    fn test_prediction_is_mean_of_trees() {
        let (x, y) = noisy_line();
        let forest = RandomForest::fit(&x, &y, &small_params(15), 42).unwrap();
        assert_eq!(forest.n_trees(), 15);

        let sample = [20.0, 0.0];
        let per_tree = forest.tree_predictions(&sample);
        let mean = per_tree.iter().sum::<f64>() / per_tree.len() as f64;
        assert!((forest.predict(&sample) - mean).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = noisy_line();
        let a = RandomForest::fit(&x, &y, &small_params(10), 42).unwrap();
        let b = RandomForest::fit(&x, &y, &small_params(10), 42).unwrap();
        assert_eq!(a.predict_batch(&x), b.predict_batch(&x));
    }

    #[test]
    fn test_bootstrap_trees_differ() {
        let (x, y) = noisy_line();
        let forest = RandomForest::fit(&x, &y, &small_params(10), 42).unwrap();
        let preds = forest.tree_predictions(&[25.0, 1.0]);
        assert!(preds.iter().any(|p| (p - preds[0]).abs() > 1e-9));
    }

    #[test]
    fn test_without_bootstrap_trees_agree() {
        let (x, y) = noisy_line();
        let params = ForestParams {
            bootstrap: false,
            ..small_params(5)
        };
        let forest = RandomForest::fit(&x, &y, &params, 42).unwrap();
        let preds = forest.tree_predictions(&[25.0, 1.0]);
        assert!(preds.iter().all(|p| (p - preds[0]).abs() < 1e-12));
    }

    #[test]
    fn test_importances_average_to_one() {
        let (x, y) = noisy_line();
        let forest = RandomForest::fit(&x, &y, &small_params(8), 42).unwrap();
        let importances = forest.feature_importances();
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_rejects_zero_estimators() {
        let (x, y) = noisy_line();
        assert!(RandomForest::fit(&x, &y, &small_params(0), 42).is_err());
    }

    #[test]
    fn test_from_trees_requires_matching_features() {
        let x1 = vec![vec![0.0], vec![1.0]];
        let x2 = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let y = vec![0.0, 1.0];
        let t1 = RegressionTree::fit(&x1, &y, &TreeParams::default(), 1).unwrap();
        let t2 = RegressionTree::fit(&x2, &y, &TreeParams::default(), 1).unwrap();
        assert!(RandomForest::from_trees(vec![t1.clone(), t2]).is_err());
        assert!(RandomForest::from_trees(vec![]).is_err());
        assert_eq!(RandomForest::from_trees(vec![t1]).unwrap().n_trees(), 1);
    }
}
