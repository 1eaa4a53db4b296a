use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Waste categories that get their own prediction models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Plastic,
    Paper,
    Organic,
    Glass,
}

impl Category {
    /// Every trained category, in reporting order.
    pub const ALL: [Category; 4] = [
        Category::Plastic,
        Category::Paper,
        Category::Organic,
        Category::Glass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "Plastic",
            Category::Paper => "Paper",
            Category::Organic => "Organic",
            Category::Glass => "Glass",
        }
    }

    /// Normalise a free-form litter type label from the detection feed.
    ///
    /// Matching is by substring on the lowercased label and accepts the Dutch
    /// labels the camera feed emits (`Papier`, `Organisch`, `Glas`). Labels
    /// that fit no category return `None` and are not used as targets.
    pub fn from_litter_type(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        if label.contains("plastic") {
            Some(Category::Plastic)
        } else if label.contains("paper") || label.contains("papier") {
            Some(Category::Paper)
        } else if label.contains("organic") || label.contains("organisch") || label.contains("bio")
        {
            Some(Category::Organic)
        } else if label.contains("glass") || label.contains("glas") {
            Some(Category::Glass)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalises_english_and_dutch_labels() {
        assert_eq!(Category::from_litter_type("Plastic"), Some(Category::Plastic));
        assert_eq!(Category::from_litter_type("plastic bottle"), Some(Category::Plastic));
        assert_eq!(Category::from_litter_type("Papier"), Some(Category::Paper));
        assert_eq!(Category::from_litter_type("Organisch"), Some(Category::Organic));
        assert_eq!(Category::from_litter_type("bio-waste"), Some(Category::Organic));
        assert_eq!(Category::from_litter_type("Glas"), Some(Category::Glass));
        assert_eq!(Category::from_litter_type(" GLASS "), Some(Category::Glass));
    }

    #[test]
    fn test_unknown_label_is_not_a_target() {
        assert_eq!(Category::from_litter_type("Metaal"), None);
        assert_eq!(Category::from_litter_type(""), None);
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&Category::Organic).unwrap();
        assert_eq!(json, "\"Organic\"");
        assert_eq!(Category::Glass.to_string(), "Glass");
    }
}
