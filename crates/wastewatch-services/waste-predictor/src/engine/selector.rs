use super::model::{ModelKind, TrainedModel};
use super::registry::CategoryModels;

/// Kind used when both scores tie.
pub const DEFAULT_KIND: ModelKind = ModelKind::Forest;

/// The model chosen to answer for one category.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub kind: ModelKind,
    pub model: &'a TrainedModel,
    pub r2: f64,
}

/// Tree only when its score is strictly higher.
pub fn preferred_kind(tree_r2: f64, forest_r2: f64) -> ModelKind {
    if tree_r2 > forest_r2 {
        ModelKind::Tree
    } else {
        DEFAULT_KIND
    }
}

/// Pick the higher-scoring model; a lone model wins by default.
pub fn select_model(models: &CategoryModels) -> Option<Selection<'_>> {
    let kind = match (&models.tree, &models.forest) {
        (Some(tree), Some(forest)) => preferred_kind(tree.r2, forest.r2),
        (Some(_), None) => ModelKind::Tree,
        (None, Some(_)) => ModelKind::Forest,
        (None, None) => return None,
    };
    models.get(kind).map(|scored| Selection {
        kind,
        model: &scored.model,
        r2: scored.r2,
    })
}
