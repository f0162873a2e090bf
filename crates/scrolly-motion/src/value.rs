//! Value resolution for single property tokens.
//!
//! A token is either a shorthand (`translateY-20` → 80 px, `opacity-50` →
//! 0.5) or an arbitrary value in brackets (`rotate-[45deg]`). Shorthand
//! numbers are scaled per [`PropertyFamily`]; arbitrary values keep their
//! unit or receive the family's implicit one.

use crate::plugin::PluginRegistry;
use crate::types::{AnimValue, PropertyFamily, split_unit};

/// Resolves `(property, token)` pairs into [`AnimValue`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueResolver<'a> {
    plugins: Option<&'a PluginRegistry>,
}

impl<'a> ValueResolver<'a> {
    /// Resolver with only the built-in rules.
    pub fn builtin() -> Self {
        Self { plugins: None }
    }

    /// Resolver that consults `plugins` before the built-in rules.
    pub fn with_plugins(plugins: &'a PluginRegistry) -> Self {
        Self {
            plugins: Some(plugins),
        }
    }

    pub fn resolve(&self, property: &str, token: &str) -> AnimValue {
        if let Some(value) = self.plugins.and_then(|p| p.resolve(property, token)) {
            return value;
        }

        match token
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
        {
            Some(inner) => resolve_arbitrary(property, inner),
            None => resolve_shorthand(property, token),
        }
    }
}

fn resolve_arbitrary(property: &str, inner: &str) -> AnimValue {
    let family = PropertyFamily::of(property);

    if family.takes_arbitrary_unit() {
        if split_unit(inner).is_some() {
            return AnimValue::Text(inner.to_string());
        }
        if is_bare_number(inner) {
            if let Ok(number) = inner.parse::<f64>() {
                return match family {
                    PropertyFamily::Rotate => AnimValue::Text(format!("{number}deg")),
                    PropertyFamily::Scale | PropertyFamily::Grayscale => AnimValue::Number(number),
                    _ => AnimValue::Text(format!("{number}px")),
                };
            }
        }
    }

    if family == PropertyFamily::Opacity {
        if let Some(number) = parse_float_prefix(inner) {
            return AnimValue::Number(number);
        }
    }

    AnimValue::Text(inner.to_string())
}

fn resolve_shorthand(property: &str, token: &str) -> AnimValue {
    let family = PropertyFamily::of(property);
    let parsed = parse_float_prefix(token);

    match family.shorthand_scale() {
        Some(scale) => AnimValue::Number(parsed.map_or(family.fallback(), |n| n * scale)),
        None => parsed.map_or_else(|| AnimValue::Text(token.to_string()), AnimValue::Number),
    }
}

/// `-?[\d.]+`
fn is_bare_number(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    !body.is_empty() && body.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Parse the longest leading decimal prefix of `text` (`"10px"` → 10).
///
/// Accepts an optional sign, digits with at most one `.`, and an optional
/// exponent. Returns `None` when no digits lead the string.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        let mut frac_digits = 0;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            frac_digits += 1;
        }
        if digits + frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

/// Inverse of the shorthand scale: the token that would resolve to `value`.
///
/// Unit-suffixed text comes back bracketed (`"45deg"` → `"[45deg]"`); a
/// numeric value for a scaled family is divided by the family multiplier.
pub fn to_shorthand(property: &str, value: &AnimValue) -> String {
    match value {
        AnimValue::Number(number) => {
            let scale = PropertyFamily::of(property).shorthand_scale().unwrap_or(1.0);
            format_number(*number / scale)
        }
        AnimValue::Text(text) if split_unit(text).is_some() => format!("[{text}]"),
        AnimValue::Text(text) => text.clone(),
    }
}

/// Format a float without float noise (`20.000000000000004` → `"20"`).
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
