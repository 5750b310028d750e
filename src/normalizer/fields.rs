//! Repair of individual scalar fields: geometry, confidence and free text

use serde_json::Value;

/// Scale of the model's `box_2d` coordinates
pub const BOX_SCALE: f64 = 1000.0;

/// Confidence used when the model gives none or an unusable one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Normalized box in image-relative units, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub const ZERO: Geometry = Geometry {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };
}

/// Convert `[ymin, xmin, ymax, xmax]` on a 0-1000 scale
///
/// Returns `None` unless the value is an array of exactly four numbers.
pub fn geometry_from_box(value: Option<&Value>) -> Option<Geometry> {
    let items = value?.as_array()?;
    let coords: Vec<f64> = items.iter().map(Value::as_f64).collect::<Option<_>>()?;
    let [ymin, xmin, ymax, xmax] = coords.as_slice() else {
        return None;
    };

    Some(Geometry {
        x: xmin / BOX_SCALE,
        y: ymin / BOX_SCALE,
        width: (xmax - xmin) / BOX_SCALE,
        height: (ymax - ymin) / BOX_SCALE,
    })
}

/// Coerce a confidence value
///
/// Numeric strings are parsed; missing, non-numeric and non-finite values fall
/// back to [`DEFAULT_CONFIDENCE`]. Values above 1 are taken as percentages and
/// divided by 100. Nothing is clamped beyond that, so `150` becomes `1.5`.
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    let confidence = match parsed {
        Some(confidence) if confidence.is_finite() => confidence,
        _ => DEFAULT_CONFIDENCE,
    };

    if confidence > 1.0 {
        confidence / 100.0
    } else {
        confidence
    }
}

/// Free text field; scalars are stringified, anything else is empty
pub fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_geometry_conversion() {
        let geometry = geometry_from_box(Some(&json!([100, 200, 300, 600]))).unwrap();
        assert_eq!(
            geometry,
            Geometry {
                x: 0.2,
                y: 0.1,
                width: 0.4,
                height: 0.2,
            }
        );
    }

    #[rstest]
    #[case::three_elements(json!([100, 200, 300]))]
    #[case::five_elements(json!([100, 200, 300, 400, 500]))]
    #[case::non_numeric(json!([100, "200", 300, 400]))]
    #[case::not_an_array(json!({"ymin": 100}))]
    fn test_geometry_rejects_malformed_boxes(#[case] value: Value) {
        assert_eq!(geometry_from_box(Some(&value)), None);
    }

    #[test]
    fn test_geometry_missing_box() {
        assert_eq!(geometry_from_box(None), None);
    }

    #[rstest]
    #[case::numeric_string(Some(json!("0.85")), 0.85)]
    #[case::padded_string(Some(json!(" 0.7 ")), 0.7)]
    #[case::missing(None, 0.5)]
    #[case::percentage(Some(json!(85)), 0.85)]
    #[case::percentage_string(Some(json!("85")), 0.85)]
    #[case::nan_string(Some(json!("NaN")), 0.5)]
    #[case::infinite_string(Some(json!("inf")), 0.5)]
    #[case::non_numeric(Some(json!("high")), 0.5)]
    #[case::wrong_type(Some(json!([0.9])), 0.5)]
    #[case::in_range(Some(json!(0.94)), 0.94)]
    #[case::exactly_one(Some(json!(1)), 1.0)]
    #[case::unclamped(Some(json!(150)), 1.5)]
    fn test_coerce_confidence(#[case] value: Option<Value>, #[case] expected: f64) {
        assert_eq!(coerce_confidence(value.as_ref()), expected);
    }

    #[test]
    fn test_text_field() {
        assert_eq!(text_field(Some(&json!("can"))), "can");
        assert_eq!(text_field(Some(&json!(42))), "42");
        assert_eq!(text_field(Some(&json!({"a": 1}))), "");
        assert_eq!(text_field(None), "");
    }
}
