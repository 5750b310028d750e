use serde::{Deserialize, Serialize};
use std::fmt;

/// Waste classification of a detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Recyclable,
    Compostable,
    NonRecyclable,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Recyclable,
        Category::Compostable,
        Category::NonRecyclable,
    ];

    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Recyclable => "recyclable",
            Category::Compostable => "compostable",
            Category::NonRecyclable => "non_recyclable",
        }
    }

    /// Parse a canonical wire name; synonyms are handled by the normalizer
    pub fn from_canonical(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }

    /// Generic noun used when a detection carries no label
    pub fn generic_noun(&self) -> &'static str {
        match self {
            Category::Recyclable => "recyclable items",
            Category::Compostable => "compostable items",
            Category::NonRecyclable => "non-recyclable items",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected object in canonical form
///
/// Geometry is normalized to the full image with the origin at the top-left.
/// `x + width <= 1` and `y + height <= 1` are not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub label: String,
    pub confidence: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub category: Category,
    pub description: String,
    pub is_trash: bool,
}
