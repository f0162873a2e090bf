//! CSS `transition` declarations for animated elements.
//!
//! Every animated element (or stagger child) receives one `transition`
//! declaration covering the properties its config animates:
//! - transform-family keys share a single `transform` entry
//! - `blur`/`grayscale` share a single `filter` entry
//! - every other key gets its own kebab-cased entry
//!
//! # Example
//!
//! ```ignore
//! use scrolly_motion::transition::TransitionSpec;
//!
//! let spec = TransitionSpec::for_config(&config);
//! host.set_style(element, "transition", &spec.to_css(&config))?;
//! ```

use serde::{Deserialize, Serialize};

use crate::style::{is_filter_key, is_transform_key};
use crate::types::AnimationConfig;

/// Duration used when a descriptor carries no `transition-duration-N`.
pub const DEFAULT_DURATION_MS: u32 = 200;

/// Easing used when a descriptor carries no `transition-easing-NAME`.
pub const DEFAULT_EASING: &str = "linear";

/// Timing shared by every entry of one `transition` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub duration_ms: u32,
    pub easing: String,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            easing: DEFAULT_EASING.to_string(),
        }
    }
}

impl TransitionSpec {
    /// Timing taken from a config's modifiers, with defaults for the rest.
    pub fn for_config(config: &AnimationConfig) -> Self {
        let defaults = Self::default();
        Self {
            duration_ms: config.transition_duration.unwrap_or(defaults.duration_ms),
            easing: config.transition_easing.clone().unwrap_or(defaults.easing),
        }
    }

    /// The transitioned style property names for `config`, in output order.
    ///
    /// Direct properties come first in first-seen order, then `transform`,
    /// then `filter`.
    pub fn properties(config: &AnimationConfig) -> Vec<String> {
        let mut direct: Vec<String> = Vec::new();
        let mut transform = false;
        let mut filter = false;

        for key in config.animated_properties() {
            if is_transform_key(key) {
                transform = true;
            } else if is_filter_key(key) {
                filter = true;
            } else {
                let name = kebab_case(key);
                if !direct.contains(&name) {
                    direct.push(name);
                }
            }
        }

        if transform {
            direct.push("transform".to_string());
        }
        if filter {
            direct.push("filter".to_string());
        }
        direct
    }

    /// Render the declaration for `config`, e.g. `opacity 200ms linear, transform 200ms linear`.
    ///
    /// Returns an empty string when nothing is animated.
    pub fn to_css(&self, config: &AnimationConfig) -> String {
        Self::properties(config)
            .iter()
            .map(|property| format!("{property} {}ms {}", self.duration_ms, self.easing))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The `transition` value for `config`.
pub fn transition_style(config: &AnimationConfig) -> String {
    TransitionSpec::for_config(config).to_css(config)
}

/// `letterSpacing` → `letter-spacing`. Already kebab-cased names pass through.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
