//! Waste category normalization and trash-flag derivation
//!
//! The raw category string is first mapped through the canonical names and a
//! synonym table. When that fails the category is inferred from the label by
//! an ordered list of rules, and finally the override rules run regardless of
//! how the category was obtained. Each rule is a plain predicate so the
//! cascade can be exercised one rule at a time.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::Category;

/// Raw category spellings that mean `non_recyclable`
pub const NON_RECYCLABLE_SYNONYMS: &[&str] = &[
    "landfill",
    "non recyclable",
    "non-recyclable",
    "trash",
    "garbage",
];

const TRASH_KEYWORDS: &[&str] = &["trash", "garbage"];
const PRINTED_MARKING_KEYWORDS: &[&str] = &["text", "label"];

static LANDFILL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"non[\s_-]?recyclable|landfill|trash|garbage").expect("valid landfill label pattern")
});

/// Lower-cased text fields a rule may look at
#[derive(Debug, Clone, Default)]
pub struct DetectionText {
    pub label: String,
    pub description: String,
}

impl DetectionText {
    pub fn new(label: &str, description: &str) -> Self {
        Self {
            label: label.to_lowercase(),
            description: description.to_lowercase(),
        }
    }

    fn mentions_any(&self, keywords: &[&str]) -> bool {
        keywords
            .iter()
            .any(|keyword| self.label.contains(keyword) || self.description.contains(keyword))
    }
}

/// Predicate mapping detection text to a category
#[derive(Clone, Copy)]
pub struct CategoryRule {
    pub name: &'static str,
    pub matches: fn(&DetectionText) -> bool,
    pub category: Category,
}

/// Label-based inference, first match wins
pub const INFERENCE_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "label_mentions_compost",
        matches: label_mentions_compost,
        category: Category::Compostable,
    },
    CategoryRule {
        name: "label_mentions_landfill",
        matches: label_mentions_landfill,
        category: Category::NonRecyclable,
    },
];

/// Category used when no inference rule matches
pub const FALLBACK_CATEGORY: Category = Category::Recyclable;

/// Rules that win over whatever category was reported or inferred
pub const OVERRIDE_RULES: &[CategoryRule] = &[CategoryRule {
    name: "printed_text_or_label",
    matches: mentions_printed_marking,
    category: Category::NonRecyclable,
}];

fn label_mentions_compost(text: &DetectionText) -> bool {
    text.label.contains("compost")
}

fn label_mentions_landfill(text: &DetectionText) -> bool {
    LANDFILL_LABEL.is_match(&text.label)
}

fn mentions_printed_marking(text: &DetectionText) -> bool {
    text.mentions_any(PRINTED_MARKING_KEYWORDS)
}

/// First rule matching the text
pub fn first_match<'a>(rules: &'a [CategoryRule], text: &DetectionText) -> Option<&'a CategoryRule> {
    rules.iter().find(|rule| (rule.matches)(text))
}

/// Map a raw category string through canonical names and synonyms
pub fn canonical_category(raw: &str) -> Option<Category> {
    let raw = raw.trim().to_lowercase();
    if NON_RECYCLABLE_SYNONYMS.contains(&raw.as_str()) {
        return Some(Category::NonRecyclable);
    }
    Category::from_canonical(&raw)
}

/// Resolve the final category of a detection
pub fn normalize_category(raw: Option<&Value>, text: &DetectionText) -> Category {
    let category = raw
        .and_then(Value::as_str)
        .and_then(canonical_category)
        .unwrap_or_else(|| {
            first_match(INFERENCE_RULES, text)
                .map(|rule| rule.category)
                .unwrap_or(FALLBACK_CATEGORY)
        });

    first_match(OVERRIDE_RULES, text)
        .map(|rule| rule.category)
        .unwrap_or(category)
}

/// Keep an explicit boolean `is_trash`, otherwise derive it
pub fn derive_is_trash(explicit: Option<&Value>, category: Category, text: &DetectionText) -> bool {
    if let Some(Value::Bool(flag)) = explicit {
        return *flag;
    }
    category == Category::NonRecyclable || text.mentions_any(TRASH_KEYWORDS)
}
