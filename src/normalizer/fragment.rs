//! Raw per-object fragments emitted by the vision model and their merge
//!
//! The model sometimes splits one object over several array entries, each
//! carrying only some of the fields. Entries describing the same object share
//! the same `box_2d`, which is used as the merge key.

use serde_json::{Map, Value};
use tracing::debug;

/// Key holding `[ymin, xmin, ymax, xmax]` on a 0-1000 scale
pub const BOX_KEY: &str = "box_2d";

/// A fragment with this many populated fields or fewer marks the whole reply
/// as fragmented
pub const FRAGMENT_FIELD_THRESHOLD: usize = 3;

/// Unprocessed model output for one object
///
/// Any field may be missing, null, wrongly typed or out of vocabulary, so the
/// raw JSON map is kept until the repair step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetectionFragment {
    fields: Map<String, Value>,
}

impl RawDetectionFragment {
    /// Wrap one array element; anything but an object becomes an empty fragment
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Non-null value of a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn box_2d(&self) -> Option<&Value> {
        self.get(BOX_KEY)
    }

    pub fn populated_fields(&self) -> usize {
        self.fields.values().filter(|value| !value.is_null()).count()
    }

    /// Overwrite fields with the non-null, non-geometry fields of a later fragment
    fn absorb(&mut self, later: RawDetectionFragment) {
        for (key, value) in later.fields {
            if key == BOX_KEY || value.is_null() {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for RawDetectionFragment {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Whether any fragment is sparse enough to suggest the reply was split
pub fn looks_fragmented(fragments: &[RawDetectionFragment]) -> bool {
    fragments
        .iter()
        .any(|fragment| fragment.populated_fields() <= FRAGMENT_FIELD_THRESHOLD)
}

/// Merge fragments sharing a `box_2d`, keeping order of first appearance
///
/// Fragments without a `box_2d` cannot be keyed and are dropped.
pub fn merge_fragments(fragments: Vec<RawDetectionFragment>) -> Vec<RawDetectionFragment> {
    let mut merged: Vec<RawDetectionFragment> = Vec::with_capacity(fragments.len());

    for (index, fragment) in fragments.into_iter().enumerate() {
        let Some(key) = fragment.box_2d().cloned() else {
            debug!("Dropping fragment {} without {}", index, BOX_KEY);
            continue;
        };

        match merged
            .iter_mut()
            .find(|group| group.box_2d().is_some_and(|other| same_box(other, &key)))
        {
            Some(group) => group.absorb(fragment),
            None => merged.push(fragment),
        }
    }

    merged
}

/// Structural box equality; numbers compare by value so `100` equals `100.0`
fn same_box(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(a_items), Some(b_items)) => {
            a_items.len() == b_items.len()
                && a_items.iter().zip(b_items).all(|(x, y)| match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => x == y,
                })
        }
        _ => a == b,
    }
}
