//! Request-time prediction.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::confidence::confidence;
use super::model::{ModelKind, ModelKindUsed, OverallKind};
use super::registry::ModelRegistry;
use crate::features::{Category, FeatureVector, WeatherCodeTable};

/// One prediction request, after boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub weather_description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPrediction {
    pub count: u32,
    pub confidence: f64,
    pub kind: ModelKindUsed,
    /// Held-out R² of the model that answered.
    pub r2: Option<f64>,
    pub tree_confidence: Option<f64>,
    pub forest_confidence: Option<f64>,
}

impl CategoryPrediction {
    /// Result for a category with no trained model.
    pub fn unavailable() -> Self {
        Self {
            count: 0,
            confidence: 0.0,
            kind: ModelKindUsed::None,
            r2: None,
            tree_confidence: None,
            forest_confidence: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub features: FeatureVector,
    pub categories: BTreeMap<Category, CategoryPrediction>,
    /// Sum over categories.
    pub total: u32,
    /// Mean confidence over categories that had a model.
    pub average_confidence: f64,
    /// Mean R² of the selected models.
    pub average_r2: f64,
    pub overall_kind: OverallKind,
}

/// Routes a feature vector through the selected model of every category.
pub struct PredictionEngine<'a> {
    registry: &'a ModelRegistry,
    weather_codes: &'a WeatherCodeTable,
}

impl<'a> PredictionEngine<'a> {
    pub fn new(registry: &'a ModelRegistry, weather_codes: &'a WeatherCodeTable) -> Self {
        Self {
            registry,
            weather_codes,
        }
    }

    /// Unknown weather descriptions fall back to the table's unknown code.
    pub fn assemble(&self, input: &PredictionInput) -> FeatureVector {
        let weather_code = self.weather_codes.code_for(&input.weather_description);
        FeatureVector::assemble(
            input.date,
            input.latitude,
            input.longitude,
            input.temperature,
            weather_code,
        )
    }

    pub fn predict(&self, input: &PredictionInput) -> Prediction {
        let features = self.assemble(input);
        self.predict_features(features)
    }

    pub fn predict_features(&self, features: FeatureVector) -> Prediction {
        let sample = features.to_array();
        let mut categories = BTreeMap::new();

        for category in Category::ALL {
            let prediction = self.predict_category(category, &sample);
            tracing::debug!(
                category = %category,
                kind = ?prediction.kind,
                count = prediction.count,
                confidence = prediction.confidence,
                "category predicted"
            );
            categories.insert(category, prediction);
        }

        let answered: Vec<&CategoryPrediction> = categories
            .values()
            .filter(|p| p.kind != ModelKindUsed::None)
            .collect();
        let total = categories.values().map(|p| p.count).sum();
        let average_confidence = mean(answered.iter().map(|p| p.confidence));
        let average_r2 = mean(answered.iter().filter_map(|p| p.r2));
        let overall_kind = overall_kind(categories.values().map(|p| p.kind));

        Prediction {
            features,
            categories,
            total,
            average_confidence,
            average_r2,
            overall_kind,
        }
    }

    fn predict_category(&self, category: Category, sample: &[f64]) -> CategoryPrediction {
        let Some(models) = self.registry.models_for(category) else {
            return CategoryPrediction::unavailable();
        };
        let Some(selection) = self.registry.select(category) else {
            return CategoryPrediction::unavailable();
        };

        let raw = selection.model.predict(sample);
        let kind_confidence = |kind: ModelKind| {
            models
                .get(kind)
                .map(|scored| confidence(&scored.model, sample))
        };

        CategoryPrediction {
            count: to_count(raw),
            confidence: confidence(selection.model, sample),
            kind: selection.kind.into(),
            r2: Some(selection.r2),
            tree_confidence: kind_confidence(ModelKind::Tree),
            forest_confidence: kind_confidence(ModelKind::Forest),
        }
    }
}

/// Floor at zero and round to the nearest integer.
pub fn to_count(raw: f64) -> u32 {
    if raw.is_finite() {
        raw.max(0.0).round() as u32
    } else {
        0
    }
}

/// Most frequently used kind; ties go to the forest, no model at all is `Mixed`.
pub fn overall_kind(kinds: impl Iterator<Item = ModelKindUsed>) -> OverallKind {
    let (mut trees, mut forests) = (0usize, 0usize);
    for kind in kinds {
        match kind {
            ModelKindUsed::Tree => trees += 1,
            ModelKindUsed::Forest => forests += 1,
            ModelKindUsed::None => {}
        }
    }
    match (trees, forests) {
        (0, 0) => OverallKind::Mixed,
        (t, f) if t > f => OverallKind::Tree,
        _ => OverallKind::Forest,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::TrainedModel;
    use crate::engine::registry::{CategoryModels, ScoredModel};
    use crate::learner::{RandomForest, RegressionTree, TreeNode};
    use chrono::Utc;

    fn leaf(value: f64) -> RegressionTree {
        RegressionTree::from_nodes(vec![TreeNode::leaf(value, 10, 0.0)], 10).unwrap()
    }

    fn registry() -> ModelRegistry {
        let mut models = BTreeMap::new();
        models.insert(
            Category::Plastic,
            CategoryModels {
                tree: Some(ScoredModel {
                    model: TrainedModel::Tree(leaf(2.4)),
                    r2: 0.3,
                }),
                forest: Some(ScoredModel {
                    model: TrainedModel::Forest(
                        RandomForest::from_trees(vec![leaf(7.0), leaf(7.0)]).unwrap(),
                    ),
                    r2: 0.5,
                }),
            },
        );
        models.insert(
            Category::Paper,
            CategoryModels {
                tree: Some(ScoredModel {
                    model: TrainedModel::Tree(leaf(-3.0)),
                    r2: 0.9,
                }),
                forest: None,
            },
        );
        ModelRegistry::new(models, Utc::now())
    }

    fn input(description: &str) -> PredictionInput {
        PredictionInput {
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            latitude: 51.59,
            longitude: 4.78,
            temperature: 18.0,
            weather_description: description.to_string(),
        }
    }

    #[test]
    fn test_selected_model_answers() {
        let registry = registry();
        let codes = WeatherCodeTable::default();
        let prediction = PredictionEngine::new(&registry, &codes).predict(&input("Sunny"));

        let plastic = &prediction.categories[&Category::Plastic];
        assert_eq!(plastic.kind, ModelKindUsed::Forest);
        assert_eq!(plastic.count, 7);
        assert_eq!(plastic.confidence, 0.9);
        assert!(plastic.tree_confidence.is_some());
        assert_eq!(plastic.forest_confidence, Some(0.9));

        // negative output floors at zero
        let paper = &prediction.categories[&Category::Paper];
        assert_eq!(paper.kind, ModelKindUsed::Tree);
        assert_eq!(paper.count, 0);
    }

    #[test]
    fn test_missing_category_reports_none() {
        let registry = registry();
        let codes = WeatherCodeTable::default();
        let prediction = PredictionEngine::new(&registry, &codes).predict(&input("Sunny"));

        let glass = &prediction.categories[&Category::Glass];
        assert_eq!(glass, &CategoryPrediction::unavailable());
        assert_eq!(prediction.total, 7);
        assert!((prediction.average_r2 - 0.7).abs() < 1e-12);
        assert_eq!(prediction.overall_kind, OverallKind::Forest);
    }

    #[test]
    fn test_unknown_weather_uses_default_code() {
        let registry = registry();
        let codes = WeatherCodeTable::default();
        let engine = PredictionEngine::new(&registry, &codes);
        let features = engine.assemble(&input("Volcanic ash"));
        assert_eq!(features.weather_code, 1);
    }

    #[test]
    fn test_empty_registry_predicts_zero() {
        let registry = ModelRegistry::empty();
        let codes = WeatherCodeTable::default();
        let prediction = PredictionEngine::new(&registry, &codes).predict(&input("Sunny"));
        assert_eq!(prediction.total, 0);
        assert_eq!(prediction.average_confidence, 0.0);
        assert_eq!(prediction.overall_kind, OverallKind::Mixed);
        assert!(prediction
            .categories
            .values()
            .all(|p| p.kind == ModelKindUsed::None));
    }

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(6.5), 7);
        assert_eq!(to_count(6.49), 6);
        assert_eq!(to_count(-2.0), 0);
        assert_eq!(to_count(f64::NAN), 0);
    }

    #[test]
    fn test_overall_kind() {
        use ModelKindUsed::*;
        assert_eq!(overall_kind([Tree, Tree, Forest].into_iter()), OverallKind::Tree);
        assert_eq!(overall_kind([Tree, Forest, None].into_iter()), OverallKind::Forest);
        assert_eq!(overall_kind([None, None].into_iter()), OverallKind::Mixed);
    }
}
