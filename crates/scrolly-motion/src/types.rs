//! Core animation types and data structures.
//!
//! This module defines the fundamental types for the engine:
//! - `ElementId`: Stable identity of a host element
//! - `AnimValue`: A resolved property value (number or unit-suffixed/pass-through text)
//! - `PropertyFamily`: Classification of property names by shorthand behaviour
//! - `TimelineStep`, `AnimationConfig`, `StaggerConfig`: Parsed descriptor output

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identifier for a host element.
///
/// Hosts may mint their own ids with [`ElementId::from_raw`] or ask for a
/// fresh unique one with [`ElementId::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Generate a new unique element ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1 << 32);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved animation value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    /// Plain number in the property's natural unit (px, deg, factor).
    Number(f64),
    /// Unit-suffixed length/angle (`"50%"`, `"45deg"`) or an opaque value.
    Text(String),
}

impl AnimValue {
    /// Try to extract a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Try to extract text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Split a `-?[\d.]+[a-z%]+` text value into its number and unit.
    pub fn split_unit(&self) -> Option<(f64, &str)> {
        match self {
            Self::Text(text) => split_unit(text),
            Self::Number(_) => None,
        }
    }

    /// True for text that already names a unit (contains a letter or `%`).
    pub fn has_unit(&self) -> bool {
        match self {
            Self::Text(text) => text.chars().any(|c| c.is_ascii_alphabetic() || c == '%'),
            Self::Number(_) => false,
        }
    }
}

impl From<f64> for AnimValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for AnimValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AnimValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl fmt::Display for AnimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Split `"-12.5px"` into `(-12.5, "px")`.
///
/// Only the strict shape `-?[\d.]+[a-zA-Z%]+` is accepted.
pub fn split_unit(text: &str) -> Option<(f64, &str)> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let number_len = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    if number_len == 0 || number_len == body.len() {
        return None;
    }
    let unit = &body[number_len..];
    if !unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
        return None;
    }
    let sign_len = text.len() - body.len();
    let number = text[..sign_len + number_len].parse::<f64>().ok()?;
    Some((number, unit))
}

/// Property name to value map, in first-seen order.
pub type PropertyMap = IndexMap<String, AnimValue>;

/// Shorthand behaviour of a property, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyFamily {
    Translate,
    Opacity,
    Scale,
    Rotate,
    Skew,
    Blur,
    Grayscale,
    Perspective,
    Other,
}

impl PropertyFamily {
    /// Classify a property name.
    ///
    /// Matching is by substring so `translateX`, `rotateZ` and `scaleY` land in
    /// their families; `opacity` must match exactly. `grayscale` is checked
    /// before `scale` since it contains it.
    pub fn of(property: &str) -> Self {
        if property.contains("translate") {
            Self::Translate
        } else if property == "opacity" {
            Self::Opacity
        } else if property.contains("grayscale") {
            Self::Grayscale
        } else if property.contains("scale") {
            Self::Scale
        } else if property.contains("rotate") {
            Self::Rotate
        } else if property.contains("blur") {
            Self::Blur
        } else if property.contains("skew") {
            Self::Skew
        } else if property.contains("perspective") {
            Self::Perspective
        } else {
            Self::Other
        }
    }

    /// Multiplier applied to shorthand (non-bracketed) numeric tokens.
    pub fn shorthand_scale(&self) -> Option<f64> {
        match self {
            Self::Translate | Self::Blur => Some(4.0),
            Self::Opacity | Self::Scale | Self::Grayscale => Some(0.01),
            Self::Rotate | Self::Skew | Self::Perspective => Some(1.0),
            Self::Other => None,
        }
    }

    /// Value used when a shorthand token for this family is not numeric.
    pub fn fallback(&self) -> f64 {
        match self {
            Self::Scale | Self::Perspective => 1.0,
            _ => 0.0,
        }
    }

    /// Whether bracketed values of this family get an implicit unit.
    pub fn takes_arbitrary_unit(&self) -> bool {
        !matches!(self, Self::Opacity | Self::Other)
    }
}

/// One keyframe of a scroll timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineStep {
    /// Progress point in [0, 1] at which `properties` are reached.
    pub at: f64,
    pub properties: PropertyMap,
}

impl TimelineStep {
    pub fn new(at: f64) -> Self {
        Self {
            at,
            properties: PropertyMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn set(mut self, property: impl Into<String>, value: impl Into<AnimValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }
}

/// A parsed animation descriptor for one breakpoint.
///
/// When `timeline` is present and non-empty it is authoritative and
/// `from`/`to` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub from: PropertyMap,
    pub to: PropertyMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<TimelineStep>>,
    /// Breakpoint this config was declared under.
    pub breakpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_easing: Option<String>,
}

impl AnimationConfig {
    pub fn new(breakpoint: impl Into<String>) -> Self {
        Self {
            from: PropertyMap::new(),
            to: PropertyMap::new(),
            timeline: None,
            breakpoint: breakpoint.into(),
            transition_duration: None,
            transition_easing: None,
        }
    }

    /// The timeline, if one is present and non-empty.
    pub fn active_timeline(&self) -> Option<&[TimelineStep]> {
        self.timeline.as_deref().filter(|steps| !steps.is_empty())
    }

    /// Every property name this config animates.
    pub fn animated_properties(&self) -> Vec<&str> {
        let keys: Vec<&str> = match self.active_timeline() {
            Some(steps) => steps
                .iter()
                .flat_map(|step| step.properties.keys())
                .map(String::as_str)
                .collect(),
            None => self.from.keys().chain(self.to.keys()).map(String::as_str).collect(),
        };
        let mut names: Vec<&str> = Vec::with_capacity(keys.len());
        for name in keys {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Values to show before the element first moves: `from`, or the first
    /// timeline step when it sits at 0.
    pub fn initial_values(&self) -> Option<&PropertyMap> {
        match self.active_timeline() {
            Some(steps) => steps
                .first()
                .filter(|step| step.at == 0.0)
                .map(|step| &step.properties),
            None => Some(&self.from).filter(|from| !from.is_empty()),
        }
    }
}

/// Default delay between consecutive stagger children, in parent-progress units.
pub const DEFAULT_STAGGER_DELAY: f64 = 0.1;

/// A parsed stagger descriptor: an animation applied to matching children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaggerConfig {
    /// Child matcher; a leading `>` restricts it to direct children.
    pub selector: String,
    #[serde(flatten)]
    pub animation: AnimationConfig,
    pub stagger_delay: f64,
}

impl StaggerConfig {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            animation: AnimationConfig::new("default"),
            stagger_delay: DEFAULT_STAGGER_DELAY,
        }
    }
}

/// Whatever animation an element ended up with after measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedAnimation {
    Simple(AnimationConfig),
    Stagger(StaggerConfig),
}

impl ResolvedAnimation {
    pub fn animation(&self) -> &AnimationConfig {
        match self {
            Self::Simple(config) => config,
            Self::Stagger(stagger) => &stagger.animation,
        }
    }
}
