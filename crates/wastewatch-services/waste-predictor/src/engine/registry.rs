//! Trained models and their scores, published as immutable snapshots.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::model::{ModelKind, TrainedModel};
use super::selector::{preferred_kind, select_model, Selection};
use crate::features::{Category, FEATURE_NAMES};

/// A fitted model with its held-out R² (clamped at zero).
#[derive(Debug, Clone)]
pub struct ScoredModel {
    pub model: TrainedModel,
    pub r2: f64,
}

/// Both model kinds for one category. Either may be missing if its fit failed.
#[derive(Debug, Clone, Default)]
pub struct CategoryModels {
    pub tree: Option<ScoredModel>,
    pub forest: Option<ScoredModel>,
}

impl CategoryModels {
    pub fn get(&self, kind: ModelKind) -> Option<&ScoredModel> {
        match kind {
            ModelKind::Tree => self.tree.as_ref(),
            ModelKind::Forest => self.forest.as_ref(),
        }
    }

    pub fn score(&self, kind: ModelKind) -> Option<f64> {
        self.get(kind).map(|m| m.r2)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_none() && self.forest.is_none()
    }
}

/// Read-only view of a registry for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub scores: BTreeMap<Category, BTreeMap<ModelKind, f64>>,
    pub average_scores: BTreeMap<ModelKind, f64>,
    /// Kind with the higher average R²; `None` when nothing is trained.
    pub best_kind: Option<ModelKind>,
    pub feature_names: Vec<&'static str>,
    pub trained_at: Option<DateTime<Utc>>,
}

/// Category → models for one training pass. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<Category, CategoryModels>,
    trained_at: Option<DateTime<Utc>>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Categories without any model are dropped.
    pub fn new(models: BTreeMap<Category, CategoryModels>, trained_at: DateTime<Utc>) -> Self {
        let models = models.into_iter().filter(|(_, m)| !m.is_empty()).collect();
        Self {
            models,
            trained_at: Some(trained_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.models.contains_key(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.models.keys().copied()
    }

    pub fn models_for(&self, category: Category) -> Option<&CategoryModels> {
        self.models.get(&category)
    }

    pub fn score(&self, category: Category, kind: ModelKind) -> Option<f64> {
        self.models_for(category).and_then(|m| m.score(kind))
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.trained_at
    }

    /// The higher-scoring model for `category`, if any.
    pub fn select(&self, category: Category) -> Option<Selection<'_>> {
        self.models_for(category).and_then(select_model)
    }

    pub fn info(&self) -> ModelInfo {
        let mut scores = BTreeMap::new();
        let mut sums: BTreeMap<ModelKind, (f64, usize)> = BTreeMap::new();

        for (category, models) in &self.models {
            let mut per_kind = BTreeMap::new();
            for kind in ModelKind::ALL {
                if let Some(r2) = models.score(kind) {
                    per_kind.insert(kind, r2);
                    let entry = sums.entry(kind).or_insert((0.0, 0));
                    entry.0 += r2;
                    entry.1 += 1;
                }
            }
            scores.insert(*category, per_kind);
        }

        let average_scores: BTreeMap<ModelKind, f64> = sums
            .into_iter()
            .map(|(kind, (sum, n))| (kind, sum / n as f64))
            .collect();

        let best_kind = match (
            average_scores.get(&ModelKind::Tree),
            average_scores.get(&ModelKind::Forest),
        ) {
            (Some(&tree), Some(&forest)) => Some(preferred_kind(tree, forest)),
            (Some(_), None) => Some(ModelKind::Tree),
            (None, Some(_)) => Some(ModelKind::Forest),
            (None, None) => None,
        };

        ModelInfo {
            scores,
            average_scores,
            best_kind,
            feature_names: FEATURE_NAMES.to_vec(),
            trained_at: self.trained_at,
        }
    }
}

/// Shared handle to the current registry snapshot.
///
/// Readers take one `Arc` per request and never observe a half-replaced
/// registry; a training pass publishes a whole new snapshot at once.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    current: RwLock<Arc<ModelRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<ModelRegistry> {
        self.current.read().clone()
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, registry: ModelRegistry) -> Arc<ModelRegistry> {
        let next = Arc::new(registry);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
