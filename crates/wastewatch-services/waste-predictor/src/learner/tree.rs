//! CART regression tree.
//!
//! Array-based node storage: node 0 is the root, every split node points at
//! two children stored after it. Each node keeps the training statistics
//! (sample count, mean, variance) that the confidence estimator reads back.

use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::LearnerError;

const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Hyperparameters for a single tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
}

impl TreeParams {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), LearnerError> {
        if self.min_samples_split < 2 {
            return Err(LearnerError::InvalidParameter(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf < 1 {
            return Err(LearnerError::InvalidParameter(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if let Some(k) = self.max_features {
            if k == 0 || k > n_features {
                return Err(LearnerError::InvalidParameter(format!(
                    "max_features must be within 1..={}, got {}",
                    n_features, k
                )));
            }
        }
        Ok(())
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 2,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

/// Routing rule of an internal node. Samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

/// A node in the regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// `None` for leaves.
    pub split: Option<Split>,
    /// Mean training target of the samples that reached this node.
    pub value: f64,
    /// Number of training samples that reached this node.
    pub n_samples: usize,
    /// Population variance of the training targets at this node.
    pub impurity: f64,
}

impl TreeNode {
    pub fn leaf(value: f64, n_samples: usize, impurity: f64) -> Self {
        Self {
            split: None,
            value,
            n_samples,
            impurity,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// Where a sample ended up after routing through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafVisit {
    pub node: usize,
    /// Number of edges between the root and the leaf.
    pub depth: usize,
}

/// A fitted regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Fit a tree on all rows of `x`.
    ///
    /// # Errors
    ///
    /// Returns `Err` on empty or ragged input, non-finite values, or invalid
    /// parameters.
    pub fn fit<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        params: &TreeParams,
        seed: u64,
    ) -> Result<Self, LearnerError> {
        let n_features = validate_training_data(x, y)?;
        params.validate(n_features)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::fit_rows(x, y, (0..x.len()).collect(), n_features, params, &mut rng))
    }

    /// Fit on a (possibly repeated) subset of pre-validated rows.
    pub(crate) fn fit_rows<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        mut indices: Vec<usize>,
        n_features: usize,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut builder = Builder {
            x,
            y,
            params,
            n_features,
            nodes: Vec::new(),
            rng,
        };
        builder.grow(&mut indices, 0);
        let nodes = builder.nodes;
        let importances = impurity_importances(&nodes, n_features);
        Self {
            nodes,
            n_features,
            importances,
        }
    }

    /// Build a tree from explicit nodes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the node list is empty, a split references a feature
    /// outside `0..n_features`, or a child pointer is out of range or does
    /// not point forward.
    pub fn from_nodes(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self, LearnerError> {
        if nodes.is_empty() {
            return Err(LearnerError::InvalidStructure("tree has no nodes".into()));
        }
        for (idx, node) in nodes.iter().enumerate() {
            if let Some(split) = node.split {
                if split.feature >= n_features {
                    return Err(LearnerError::InvalidStructure(format!(
                        "node {} splits on feature {} but tree has {} features",
                        idx, split.feature, n_features
                    )));
                }
                for child in [split.left, split.right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(LearnerError::InvalidStructure(format!(
                            "node {} has invalid child {}",
                            idx, child
                        )));
                    }
                }
            }
        }
        let importances = impurity_importances(&nodes, n_features);
        Ok(Self {
            nodes,
            n_features,
            importances,
        })
    }

    /// Route a sample to its leaf.
    ///
    /// Missing features read as `0.0`; NaN comparisons route right.
    pub fn apply(&self, features: &[f64]) -> LeafVisit {
        let mut node = 0usize;
        let mut depth = 0usize;
        while let Some(split) = self.nodes[node].split {
            let value = features.get(split.feature).copied().unwrap_or(0.0);
            node = if value <= split.threshold {
                split.left
            } else {
                split.right
            };
            depth += 1;
        }
        LeafVisit { node, depth }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.nodes[self.apply(features).node].value
    }

    pub fn predict_batch<R: AsRef<[f64]>>(&self, samples: &[R]) -> Vec<f64> {
        samples.iter().map(|s| self.predict(s.as_ref())).collect()
    }

    pub fn node_at(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        match self.nodes[idx].split {
            None => 0,
            Some(split) => 1 + self.node_depth(split.left).max(self.node_depth(split.right)),
        }
    }

    /// Normalised impurity decrease per feature; all zeros for a single leaf.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

/// Checks shape and finiteness, returning the feature count.
pub(crate) fn validate_training_data<R: AsRef<[f64]>>(
    x: &[R],
    y: &[f64],
) -> Result<usize, LearnerError> {
    if x.is_empty() {
        return Err(LearnerError::EmptyInput);
    }
    if x.len() != y.len() {
        return Err(LearnerError::DimensionMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }
    let n_features = x[0].as_ref().len();
    if n_features == 0 {
        return Err(LearnerError::InvalidParameter("rows have no features".into()));
    }
    for row in x {
        let row = row.as_ref();
        if row.len() != n_features {
            return Err(LearnerError::DimensionMismatch {
                expected: n_features,
                found: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(LearnerError::NonFinite);
        }
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(LearnerError::NonFinite);
    }
    Ok(n_features)
}

fn impurity_importances(nodes: &[TreeNode], n_features: usize) -> Vec<f64> {
    let mut importances = vec![0.0; n_features];
    for node in nodes {
        if let Some(split) = node.split {
            let left = &nodes[split.left];
            let right = &nodes[split.right];
            let decrease = node.n_samples as f64 * node.impurity
                - left.n_samples as f64 * left.impurity
                - right.n_samples as f64 * right.impurity;
            importances[split.feature] += decrease.max(0.0);
        }
    }
    let total: f64 = importances.iter().sum();
    if total > 0.0 {
        for value in &mut importances {
            *value /= total;
        }
    }
    importances
}

struct CandidateSplit {
    feature: usize,
    threshold: f64,
    children_sse: f64,
}

struct Builder<'a, R> {
    x: &'a [R],
    y: &'a [f64],
    params: &'a TreeParams,
    n_features: usize,
    nodes: Vec<TreeNode>,
    rng: &'a mut ChaCha8Rng,
}

impl<'a, R: AsRef<[f64]>> Builder<'a, R> {
    fn value(&self, row: usize, feature: usize) -> f64 {
        self.x[row].as_ref()[feature]
    }

    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let mean = sum / n as f64;
        let sse: f64 = indices.iter().map(|&i| (self.y[i] - mean).powi(2)).sum();

        let id = self.nodes.len();
        self.nodes.push(TreeNode::leaf(mean, n, sse / n as f64));

        let splittable = depth < self.params.max_depth
            && n >= self.params.min_samples_split
            && n >= 2 * self.params.min_samples_leaf
            && sse > MIN_IMPURITY_DECREASE;
        if !splittable {
            return id;
        }

        let Some(best) = self.best_split(indices, sse) else {
            return id;
        };

        let (feature, threshold) = (best.feature, best.threshold);
        let mut left: Vec<usize> = Vec::with_capacity(n);
        let mut right: Vec<usize> = Vec::with_capacity(n);
        for &i in indices.iter() {
            if self.value(i, feature) <= threshold {
                left.push(i);
            } else {
                right.push(i);
            }
        }

        let left_id = self.grow(&mut left, depth + 1);
        let right_id = self.grow(&mut right, depth + 1);
        self.nodes[id].split = Some(Split {
            feature,
            threshold,
            left: left_id,
            right: right_id,
        });
        id
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                let mut chosen = sample(&mut *self.rng, self.n_features, k).into_vec();
                chosen.sort_unstable();
                chosen
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn best_split(&mut self, indices: &[usize], parent_sse: f64) -> Option<CandidateSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<CandidateSplit> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for feature in self.candidate_features() {
            order.sort_by(|&a, &b| self.value(a, feature).total_cmp(&self.value(b, feature)));

            let total_sum: f64 = order.iter().map(|&i| self.y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| self.y[i] * self.y[i]).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 1..n {
                let prev = order[pos - 1];
                let target = self.y[prev];
                left_sum += target;
                left_sq += target * target;

                let lo = self.value(prev, feature);
                let hi = self.value(order[pos], feature);
                if pos < min_leaf || n - pos < min_leaf || hi <= lo {
                    continue;
                }

                let n_left = pos as f64;
                let n_right = (n - pos) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = (left_sq - left_sum * left_sum / n_left).max(0.0);
                let right_sse = (right_sq - right_sum * right_sum / n_right).max(0.0);
                let children_sse = left_sse + right_sse;

                let improves = best
                    .as_ref()
                    .map_or(true, |b| children_sse < b.children_sse);
                if improves {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(CandidateSplit {
                        feature,
                        threshold,
                        children_sse,
                    });
                }
            }
        }

        best.filter(|b| parent_sse - b.children_sse > MIN_IMPURITY_DECREASE)
    }
}
