//! Scroll-config grammar and enter/exit thresholds.
//!
//! A scroll config such as `enter:20vh;exit:40vh;once:true;damping:0.1`
//! fixes where an element's progress starts (`enter_at`), where it is
//! considered exited (`exit_at`) and how much scrolling spans 0 → 1
//! (`distance`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::split_unit;

/// Scroll config applied to elements that carry an animation but no config.
pub const DEFAULT_SCROLL_CONFIG: &str = "enter:10vh;exit:40vh;once:false;damping:0;friction:0.95";

/// Default friction for elements that do not set one.
pub const DEFAULT_FRICTION: f64 = 0.95;

/// A coerced scroll-config value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// `"true"`/`"false"` become booleans, full numbers become floats.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match raw.parse::<f64>() {
                Ok(number) if !raw.is_empty() => Self::Number(number),
                _ => Self::Text(raw.to_string()),
            },
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text form, as written.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(t) => t.clone(),
        }
    }
}

/// A parsed scroll config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollConfig {
    pub enter: Option<ConfigValue>,
    pub exit: Option<ConfigValue>,
    pub distance: Option<ConfigValue>,
    pub once: bool,
    pub theme: Option<String>,
    pub enter_classes: Vec<String>,
    pub leave_classes: Vec<String>,
    /// Selectors for progress widgets inside the element.
    pub widgets: Vec<String>,
    pub damping: f64,
    pub friction: f64,
    /// Unknown keys, kept verbatim.
    pub extra: IndexMap<String, ConfigValue>,
}

impl ScrollConfig {
    /// Parse `key:value;key:value`. Keys without a value are ignored.
    pub fn parse(source: &str) -> Self {
        let mut values: IndexMap<String, ConfigValue> = IndexMap::new();
        for pair in source.split(';') {
            let Some((key, raw)) = pair.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            // Only the text up to a second `:` counts as the value.
            let raw = raw.split(':').next().unwrap_or_default().trim();
            values.insert(key.to_string(), ConfigValue::coerce(raw));
        }
        Self::from_values(values)
    }

    fn from_values(mut values: IndexMap<String, ConfigValue>) -> Self {
        let text = |v: Option<ConfigValue>| v.map(|v| v.to_text());
        let enter_class = values
            .shift_remove("enterClass")
            .or_else(|| values.shift_remove("class"));
        values.shift_remove("class");

        Self {
            enter: values.shift_remove("enter"),
            exit: values.shift_remove("exit"),
            distance: values.shift_remove("distance"),
            once: values
                .shift_remove("once")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            theme: text(values.shift_remove("theme")).filter(|t| !t.is_empty()),
            enter_classes: parse_class_list(text(enter_class).as_deref()),
            leave_classes: parse_class_list(text(values.shift_remove("leaveClass")).as_deref()),
            widgets: parse_class_list(text(values.shift_remove("wc")).as_deref()),
            damping: values
                .shift_remove("damping")
                .and_then(|v| v.as_f64())
                .map_or(0.0, |d| d.clamp(0.0, 1.0)),
            friction: values
                .shift_remove("friction")
                .and_then(|v| v.as_f64())
                .unwrap_or(DEFAULT_FRICTION),
            extra: values,
        }
    }

    /// Whether the element has damped progress.
    pub fn is_damped(&self) -> bool {
        self.damping > 0.0
    }
}

/// Split a whitespace-separated list, stripping one pair of outer quotes.
pub fn parse_class_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let raw = raw.trim();
    let raw = raw.strip_prefix(['\'', '"']).unwrap_or(raw);
    let raw = raw.strip_suffix(['\'', '"']).unwrap_or(raw);
    raw.split_whitespace().map(str::to_string).collect()
}

/// Resolve a length against the viewport height.
///
/// `vh` and `%` are fractions of the viewport, `px` is absolute, a bare
/// number in (0, 1) is a viewport fraction and any other bare number is
/// taken as-is. Anything else resolves to 0.
pub fn resolve_length(value: &ConfigValue, viewport_height: f64) -> f64 {
    match value {
        ConfigValue::Number(n) if *n > 0.0 && *n < 1.0 => n * viewport_height,
        ConfigValue::Number(n) => *n,
        ConfigValue::Text(text) => match split_unit(text) {
            Some((n, "vh" | "%")) => viewport_height * (n / 100.0),
            Some((n, "px")) => n,
            _ => 0.0,
        },
        ConfigValue::Bool(_) => 0.0,
    }
}

/// Element geometry at measurement time, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub top: f64,
    pub height: f64,
}

/// Scroll positions that map scroll to progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub enter_at: f64,
    pub exit_at: f64,
    pub distance: f64,
}

impl Thresholds {
    /// Compute thresholds for an element.
    ///
    /// `default_enter` is used when the config sets no `enter`.
    pub fn compute(
        config: &ScrollConfig,
        geometry: Geometry,
        viewport_height: f64,
        default_enter: &ConfigValue,
    ) -> Self {
        let enter_offset = resolve_length(config.enter.as_ref().unwrap_or(default_enter), viewport_height);
        let exit_offset = config
            .exit
            .as_ref()
            .map_or(0.0, |exit| resolve_length(exit, viewport_height));

        let enter_at = geometry.top - (viewport_height - enter_offset);
        let exit_at = geometry.top + geometry.height - exit_offset;

        let distance = match (&config.exit, &config.distance) {
            (Some(_), None) => exit_at - enter_at,
            (_, Some(distance)) => resolve_length(distance, viewport_height),
            (None, None) => geometry.height,
        };

        Self {
            enter_at,
            exit_at,
            distance,
        }
    }

    /// Progress in [0, 1] for a scroll position.
    ///
    /// A non-positive distance degrades to a step at `enter_at`.
    pub fn progress(&self, scroll_y: f64) -> f64 {
        if self.distance <= 0.0 || !self.distance.is_finite() {
            return if scroll_y >= self.enter_at { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.enter_at) / self.distance).clamp(0.0, 1.0)
    }

    /// In view: entered and not past the exit point.
    pub fn in_view(&self, progress: f64, scroll_y: f64) -> bool {
        progress > 0.0 && scroll_y <= self.exit_at
    }
}
