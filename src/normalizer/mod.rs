//! Vision-model response normalization
//!
//! Turns the free-form text returned by the vision model into canonical
//! [`DetectionRecord`]s. The pipeline is pure and runs in five steps:
//!
//! 1. **Fragment merge**: entries split across the array are merged by `box_2d`
//! 2. **Geometry**: `[ymin, xmin, ymax, xmax]` on 0-1000 becomes `x/y/width/height` on 0-1
//! 3. **Confidence**: numeric strings parsed, percentages scaled, garbage defaulted
//! 4. **Category**: synonyms mapped, label-based inference, override rules
//! 5. **Trash flag**: explicit boolean kept, otherwise derived
//!
//! Only a reply that cannot be read as a JSON array fails. Anomalies inside
//! individual records are repaired.

use serde_json::Value;
use tracing::debug;

use crate::errors::NormalizeError;
use crate::models::DetectionRecord;

pub mod category;
pub mod fields;
pub mod fragment;

pub use category::{CategoryRule, DetectionText};
pub use fields::Geometry;
pub use fragment::RawDetectionFragment;

/// Normalize the raw model reply into ordered detection records
pub fn normalize(raw: &str) -> Result<Vec<DetectionRecord>, NormalizeError> {
    let body = strip_code_fence(raw);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| NormalizeError::malformed(format!("invalid JSON: {e}"), raw))?;
    let Value::Array(items) = value else {
        return Err(NormalizeError::malformed(
            "expected a JSON array of detections",
            raw,
        ));
    };

    let fragments: Vec<RawDetectionFragment> = items
        .into_iter()
        .map(RawDetectionFragment::from_value)
        .collect();

    let fragments = if fragment::looks_fragmented(&fragments) {
        let before = fragments.len();
        let merged = fragment::merge_fragments(fragments);
        debug!("Merged {} fragments into {} detections", before, merged.len());
        merged
    } else {
        fragments
    };

    Ok(fragments.iter().enumerate().map(repair_fragment).collect())
}

/// Strip a surrounding markdown code fence, with or without a language tag
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn repair_fragment((index, fragment): (usize, &RawDetectionFragment)) -> DetectionRecord {
    let label = fields::text_field(fragment.get("label"));
    let description = fields::text_field(fragment.get("description"));
    let text = DetectionText::new(&label, &description);

    let geometry = fields::geometry_from_box(fragment.box_2d()).unwrap_or_else(|| {
        debug!("Detection {} has no usable box_2d, using zero geometry", index);
        Geometry::ZERO
    });
    let confidence = fields::coerce_confidence(fragment.get("confidence"));
    let category = category::normalize_category(fragment.get("category"), &text);
    let is_trash = category::derive_is_trash(fragment.get("is_trash"), category, &text);

    DetectionRecord {
        label,
        confidence,
        x: geometry.x,
        y: geometry.y,
        width: geometry.width,
        height: geometry.height,
        category,
        description,
        is_trash,
    }
}
