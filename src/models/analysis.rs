use serde::{Deserialize, Serialize};

use super::detection::{Category, DetectionRecord};

/// Per-category detection counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub recyclable: usize,
    pub compostable: usize,
    pub non_recyclable: usize,
    pub total: usize,
}

impl CategorySummary {
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Recyclable => self.recyclable,
            Category::Compostable => self.compostable,
            Category::NonRecyclable => self.non_recyclable,
        }
    }
}

/// Normalized detections of one image together with the derived summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detections: Vec<DetectionRecord>,
    pub summary: CategorySummary,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Build the summary and recommendations for a set of detections
    pub fn from_detections(detections: Vec<DetectionRecord>) -> Self {
        let mut summary = CategorySummary {
            total: detections.len(),
            ..Default::default()
        };
        for detection in &detections {
            match detection.category {
                Category::Recyclable => summary.recyclable += 1,
                Category::Compostable => summary.compostable += 1,
                Category::NonRecyclable => summary.non_recyclable += 1,
            }
        }

        let recommendations = recommendations_for(&detections);

        Self {
            detections,
            summary,
            recommendations,
        }
    }
}

fn recommendations_for(detections: &[DetectionRecord]) -> Vec<String> {
    if detections.is_empty() {
        return vec!["No waste items detected; try a clearer photo".to_string()];
    }

    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let labels = labels_in(detections, category)?;
            Some(match category {
                Category::Recyclable => format!("Separate recyclable items ({labels}) for recycling"),
                Category::Compostable => format!("Compost the {labels}"),
                Category::NonRecyclable => format!("Dispose of {labels} in landfill"),
            })
        })
        .collect()
}

/// Distinct labels of one category in detection order, `None` when the
/// category has no detections at all
fn labels_in(detections: &[DetectionRecord], category: Category) -> Option<String> {
    let mut present = false;
    let mut labels: Vec<&str> = Vec::new();
    for detection in detections.iter().filter(|d| d.category == category) {
        present = true;
        let label = detection.label.trim();
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    }

    match (present, labels.is_empty()) {
        (false, _) => None,
        (true, true) => Some(category.generic_noun().to_string()),
        (true, false) => Some(labels.join(", ")),
    }
}
