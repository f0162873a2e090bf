//! Interpolation of property maps by progress.
//!
//! This module provides the `Interpolate` trait for single values and the
//! two map-level rules built on it:
//! - simple mode: `from` → `to` with implicit defaults for one-sided keys
//! - timeline mode: interpolation inside the bracketing pair of steps

use crate::types::{AnimValue, AnimationConfig, PropertyMap, TimelineStep};
use crate::value::format_number;

/// Progress at which non-interpolable values switch from start to end.
pub const DISCRETE_SWITCH: f64 = 0.5;

/// Trait for types that can be interpolated between two values.
pub trait Interpolate: Sized {
    /// When t = 0.0, returns self. When t = 1.0, returns to.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

/// Linear interpolation helper for f64 values.
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for AnimValue {
    /// Numbers lerp; unit-suffixed text with the same unit lerps its number;
    /// anything else switches at [`DISCRETE_SWITCH`].
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(lerp(*a, *b, t)),
            (Self::Text(_), Self::Text(_)) => match (self.split_unit(), to.split_unit()) {
                (Some((a, unit_a)), Some((b, unit_b))) if unit_a == unit_b => {
                    Self::Text(format!("{}{unit_a}", format_number(lerp(a, b, t))))
                }
                _ => discrete(self, to, t),
            },
            _ => discrete(self, to, t),
        }
    }
}

fn discrete(from: &AnimValue, to: &AnimValue, t: f64) -> AnimValue {
    if t < DISCRETE_SWITCH {
        from.clone()
    } else {
        to.clone()
    }
}

/// Value a one-sided `from` key moves toward.
fn implicit_end(property: &str) -> f64 {
    if property == "opacity" { 1.0 } else { 0.0 }
}

/// Interpolate a `from`/`to` pair.
///
/// Keys only in `from` move toward 1 (`opacity`) or 0 when numeric and hold
/// otherwise; keys only in `to` grow from 0 when numeric and appear once
/// progress is positive otherwise.
pub fn interpolate_maps(from: &PropertyMap, to: &PropertyMap, progress: f64) -> PropertyMap {
    let mut values = PropertyMap::with_capacity(from.len() + to.len());

    for (key, start) in from {
        let value = match (to.get(key), start) {
            (Some(end), _) => start.interpolate(end, progress),
            (None, AnimValue::Number(n)) => AnimValue::Number(lerp(*n, implicit_end(key), progress)),
            (None, text) => text.clone(),
        };
        values.insert(key.clone(), value);
    }

    for (key, end) in to {
        if from.contains_key(key) {
            continue;
        }
        match end {
            AnimValue::Number(n) => {
                values.insert(key.clone(), AnimValue::Number(lerp(0.0, *n, progress)));
            }
            text if progress > 0.0 => {
                values.insert(key.clone(), text.clone());
            }
            _ => {}
        }
    }

    values
}

/// Interpolate a sorted timeline.
///
/// Before the first step the first step's values apply verbatim. Inside a
/// segment, keys present only in the lower step hold; keys present only in
/// the upper step appear once segment progress is positive.
pub fn interpolate_timeline(steps: &[TimelineStep], progress: f64) -> PropertyMap {
    let Some(first) = steps.first() else {
        return PropertyMap::new();
    };

    let index = steps.iter().rposition(|step| progress >= step.at).unwrap_or(0);
    let current = steps.get(index).unwrap_or(first);
    let next = steps.get(index + 1);

    let Some(next) = next.filter(|_| progress > current.at) else {
        return current.properties.clone();
    };

    let span = next.at - current.at;
    let t = if span > 0.0 { (progress - current.at) / span } else { 1.0 };

    let mut values = PropertyMap::new();
    for (key, start) in &current.properties {
        let value = match next.properties.get(key) {
            Some(end) => start.interpolate(end, t),
            None => start.clone(),
        };
        values.insert(key.clone(), value);
    }
    for (key, end) in &next.properties {
        if !current.properties.contains_key(key) && t > 0.0 {
            values.insert(key.clone(), end.clone());
        }
    }
    values
}

/// Current values of `config` at `progress`.
pub fn interpolate_config(config: &AnimationConfig, progress: f64) -> PropertyMap {
    match config.active_timeline() {
        Some(steps) => interpolate_timeline(steps, progress),
        None => interpolate_maps(&config.from, &config.to, progress),
    }
}
