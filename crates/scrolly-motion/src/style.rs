//! Mapping of interpolated property values onto style declarations.
//!
//! Transform-family keys fold into a single `transform` in a fixed function
//! order, `blur`/`grayscale` fold into `filter`, and everything else is a
//! direct property. A failure to apply one declaration never blocks the
//! others.

use tracing::warn;

use crate::host::StyleSink;
use crate::types::{AnimValue, ElementId, PropertyMap};
use crate::value::format_number;

/// Custom property carrying the element's progress with three decimals.
pub const PROGRESS_PROPERTY: &str = "--element-progress";

/// Transform functions in application order.
pub const TRANSFORM_ORDER: [&str; 12] = [
    "translateX",
    "translateY",
    "translateZ",
    "scale",
    "scaleX",
    "scaleY",
    "rotate",
    "rotateX",
    "rotateY",
    "rotateZ",
    "skewX",
    "skewY",
];

/// Filter functions in application order.
pub const FILTER_ORDER: [&str; 2] = ["blur", "grayscale"];

pub fn is_transform_key(key: &str) -> bool {
    TRANSFORM_ORDER.contains(&key)
}

pub fn is_filter_key(key: &str) -> bool {
    FILTER_ORDER.contains(&key)
}

/// Implicit unit for a bare number written to `key`.
fn unit_for(key: &str) -> &'static str {
    if key.starts_with("rotate") || key.starts_with("skew") {
        "deg"
    } else if key.starts_with("translate") || matches!(key, "blur" | "perspective" | "letter-spacing") {
        "px"
    } else {
        ""
    }
}

/// Render a value, appending the key's unit unless the value carries one.
fn with_unit(key: &str, value: &AnimValue) -> String {
    match value {
        AnimValue::Number(n) => format!("{}{}", format_number(*n), unit_for(key)),
        text if text.has_unit() => text.to_string(),
        AnimValue::Text(raw) => {
            let unit = unit_for(key);
            if raw.is_empty() || unit.is_empty() {
                raw.clone()
            } else {
                format!("{raw}{unit}")
            }
        }
    }
}

fn plain(value: &AnimValue) -> String {
    match value {
        AnimValue::Number(n) => format_number(*n),
        AnimValue::Text(text) => text.clone(),
    }
}

/// Style declarations for a set of values.
///
/// Direct properties come first in key order, followed by `transform` and
/// `filter` when any of their keys are present.
pub fn style_declarations(values: &PropertyMap) -> Vec<(String, String)> {
    let mut declarations = Vec::new();

    for (key, value) in values {
        if is_transform_key(key) || is_filter_key(key) {
            continue;
        }
        let rendered = match key.as_str() {
            "perspective" | "letter-spacing" => with_unit(key, value),
            _ => plain(value),
        };
        declarations.push((key.clone(), rendered));
    }

    let transform: Vec<String> = TRANSFORM_ORDER
        .iter()
        .filter_map(|key| values.get(*key).map(|v| format!("{key}({})", with_unit(key, v))))
        .collect();
    if !transform.is_empty() {
        declarations.push(("transform".to_string(), transform.join(" ")));
    }

    let filter: Vec<String> = FILTER_ORDER
        .iter()
        .filter_map(|key| values.get(*key).map(|v| format!("{key}({})", with_unit(key, v))))
        .collect();
    if !filter.is_empty() {
        declarations.push(("filter".to_string(), filter.join(" ")));
    }

    declarations
}

/// Apply `values` to `element`. Returns how many declarations were accepted.
pub fn apply_values<S: StyleSink + ?Sized>(sink: &mut S, element: ElementId, values: &PropertyMap) -> usize {
    style_declarations(values)
        .into_iter()
        .filter(|(property, value)| apply_one(sink, element, property, value))
        .count()
}

/// Write `--element-progress`.
pub fn apply_progress<S: StyleSink + ?Sized>(sink: &mut S, element: ElementId, progress: f64) -> bool {
    apply_one(sink, element, PROGRESS_PROPERTY, &format!("{progress:.3}"))
}

pub(crate) fn apply_one<S: StyleSink + ?Sized>(sink: &mut S, element: ElementId, property: &str, value: &str) -> bool {
    match sink.set_style(element, property, value) {
        Ok(()) => true,
        Err(err) => {
            warn!(%element, property, value, %err, "failed to apply style");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use crate::threshold::Geometry;

    fn values(pairs: &[(&str, AnimValue)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_transform_fixed_order() {
        let v = values(&[
            ("rotate", AnimValue::Number(45.0)),
            ("scale", AnimValue::Number(0.5)),
            ("translateY", AnimValue::Number(80.0)),
            ("translateX", AnimValue::Text("50%".into())),
        ]);
        let declarations = style_declarations(&v);
        assert_eq!(
            declarations,
            vec![(
                "transform".to_string(),
                "translateX(50%) translateY(80px) scale(0.5) rotate(45deg)".to_string()
            )]
        );
    }

    #[test]
    fn test_direct_and_filter() {
        let v = values(&[
            ("grayscale", AnimValue::Number(0.5)),
            ("opacity", AnimValue::Number(0.25)),
            ("blur", AnimValue::Number(8.0)),
            ("perspective", AnimValue::Number(800.0)),
            ("letter-spacing", AnimValue::Text("0.1em".into())),
            ("color", AnimValue::Text("red".into())),
        ]);
        let declarations = style_declarations(&v);
        assert_eq!(
            declarations,
            vec![
                ("opacity".to_string(), "0.25".to_string()),
                ("perspective".to_string(), "800px".to_string()),
                ("letter-spacing".to_string(), "0.1em".to_string()),
                ("color".to_string(), "red".to_string()),
                ("filter".to_string(), "blur(8px) grayscale(0.5)".to_string()),
            ]
        );
    }

    #[test]
    fn test_skew_and_rotate_units() {
        let v = values(&[("skewX", AnimValue::Number(-10.0)), ("rotateX", AnimValue::Text("0.5turn".into()))]);
        assert_eq!(
            style_declarations(&v),
            vec![("transform".to_string(), "rotateX(0.5turn) skewX(-10deg)".to_string())]
        );
    }

    #[test]
    fn test_apply_is_fault_isolated() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let el = doc.add_element("div", Geometry::default());
        doc.reject_property("color");

        let v = values(&[
            ("color", AnimValue::Text("red".into())),
            ("opacity", AnimValue::Number(1.0)),
            ("translateY", AnimValue::Number(4.0)),
        ]);
        assert_eq!(apply_values(&mut doc, el, &v), 2);
        assert_eq!(doc.style(el, "opacity"), Some("1"));
        assert_eq!(doc.style(el, "transform"), Some("translateY(4px)"));
        assert_eq!(doc.style(el, "color"), None);
    }

    #[test]
    fn test_apply_progress_three_decimals() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let el = doc.add_element("div", Geometry::default());
        assert!(apply_progress(&mut doc, el, 0.12345));
        assert_eq!(doc.style(el, PROGRESS_PROPERTY), Some("0.123"));
        apply_progress(&mut doc, el, 0.0);
        assert_eq!(doc.style(el, PROGRESS_PROPERTY), Some("0.000"));
    }
}
