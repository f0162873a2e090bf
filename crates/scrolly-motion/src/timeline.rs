//! Timeline grammar: `from:opacity-0; via-40%:opacity-60|scale-110; to:opacity-100`.
//!
//! Each `;`-separated step has a marker and a property list separated by the
//! first `:`. Markers are `from` (0), `to` (1), `via-P%` (P/100) or a raw
//! decimal. Steps whose marker does not parse are skipped.

use tracing::trace;

use crate::types::{PropertyMap, TimelineStep};
use crate::value::{ValueResolver, parse_float_prefix};

const LETTER_SPACING: &str = "letter-spacing";

/// Parse a `;`-delimited step list, sorted ascending by `at`.
///
/// Steps with equal `at` keep their source order.
pub fn parse_timeline(source: &str, resolver: &ValueResolver<'_>) -> Vec<TimelineStep> {
    let mut steps: Vec<TimelineStep> = source
        .split(';')
        .filter_map(|segment| parse_step(segment, resolver))
        .collect();
    steps.sort_by(|a, b| a.at.total_cmp(&b.at));
    steps
}

fn parse_step(segment: &str, resolver: &ValueResolver<'_>) -> Option<TimelineStep> {
    let segment = segment.trim();
    let (marker, body) = segment.split_once(':')?;
    let Some(at) = parse_marker(marker.trim()) else {
        trace!(marker, "skipping timeline step with unknown marker");
        return None;
    };
    Some(TimelineStep {
        at,
        properties: parse_properties(body, resolver),
    })
}

/// Progress point for a step marker.
pub fn parse_marker(marker: &str) -> Option<f64> {
    match marker {
        "from" => Some(0.0),
        "to" => Some(1.0),
        _ => match marker
            .strip_prefix("via-")
            .and_then(|rest| rest.strip_suffix('%'))
        {
            Some(percent) => parse_float_prefix(percent).map(|p| p / 100.0),
            None => parse_float_prefix(marker),
        },
    }
}

/// True for `transition-duration-N` / `transition-easing-NAME` tokens.
pub fn is_modifier_token(token: &str) -> bool {
    token.starts_with("transition-duration-") || token.starts_with("transition-easing-")
}

/// Split a property list on `|` and whitespace, dropping empty tokens.
pub fn property_tokens(body: &str) -> impl Iterator<Item = &str> {
    body.split(|c: char| c == '|' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Split one `key-value` token on its first dash.
pub fn split_property_token(token: &str) -> Option<(&str, &str)> {
    if let Some(rest) = token.strip_prefix(LETTER_SPACING) {
        let value = rest.strip_prefix('-').unwrap_or(rest);
        return Some((LETTER_SPACING, value));
    }
    match token.find('-') {
        Some(dash) if dash > 0 => Some((&token[..dash], &token[dash + 1..])),
        _ => None,
    }
}

/// Parse a property list into a map, resolving each value.
///
/// Later tokens overwrite earlier ones with the same key. Transition
/// modifiers are not properties and are skipped.
pub fn parse_properties(body: &str, resolver: &ValueResolver<'_>) -> PropertyMap {
    let mut properties = PropertyMap::new();
    for token in property_tokens(body) {
        if is_modifier_token(token) {
            continue;
        }
        if let Some((key, raw)) = split_property_token(token) {
            properties.insert(key.to_string(), resolver.resolve(key, raw));
        }
    }
    properties
}
