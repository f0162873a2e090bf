//! Stagger descriptor parser.
//!
//! ```text
//! [>h1]:from:opacity-0|translateY-20;to:opacity-100|translateY-0|stagger-0.2
//! @desktop:[li]:from:opacity-0;via-50%:opacity-100|stagger-0.05;to:scale-100
//! ```
//!
//! The selector token must open the descriptor. A `]` inside the selector is
//! written `\]`. A `stagger-N` token anywhere in a property list sets the
//! delay between consecutive children and is not itself a property.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use super::TransitionModifiers;
use crate::breakpoint::DEFAULT_BREAKPOINT;
use crate::error::{ParseError, ParseResult};
use crate::timeline::{parse_marker, parse_properties, property_tokens};
use crate::types::{DEFAULT_STAGGER_DELAY, StaggerConfig, TimelineStep};
use crate::value::{ValueResolver, parse_float_prefix};

static BREAKPOINT_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^:\[\]\s]+):\[").expect("breakpoint head regex"));
static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(from:|via-|to:)").expect("step regex"));

const STAGGER_PREFIX: &str = "stagger-";

/// Parses stagger descriptors into [`StaggerConfig`]s.
pub struct StaggerParser<'a> {
    resolver: ValueResolver<'a>,
}

impl<'a> StaggerParser<'a> {
    pub fn new(resolver: ValueResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Parse one `[selector]:body` descriptor.
    pub fn parse(&self, source: &str) -> ParseResult<StaggerConfig> {
        let source = source.trim();
        let (selector, body) = split_selector(source)?;
        let modifiers = TransitionModifiers::scan(source)?;

        let mut config = StaggerConfig::new(selector);
        self.parse_body(body.trim(), &mut config);
        modifiers.apply(&mut config.animation);
        Ok(config)
    }

    /// Parse a chain of `@name:[selector]:...` segments keyed by breakpoint.
    ///
    /// A leading segment without `@name:` is the `default` entry.
    pub fn parse_breakpoints(&self, source: &str) -> ParseResult<IndexMap<String, StaggerConfig>> {
        let source = source.trim();
        let mut variants = IndexMap::new();

        let heads: Vec<_> = BREAKPOINT_HEAD_RE
            .captures_iter(source)
            .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?.as_str())))
            .collect();

        let first_head = heads.first().map_or(source.len(), |(whole, _)| whole.start());
        let leading = source[..first_head].trim();
        if !leading.is_empty() {
            variants.insert(DEFAULT_BREAKPOINT.to_string(), self.parse(leading)?);
        }

        for (index, (whole, name)) in heads.iter().enumerate() {
            // Body starts at the `[` that the head regex consumed last.
            let body_start = whole.end() - 1;
            let body_end = heads.get(index + 1).map_or(source.len(), |(next, _)| next.start());
            let mut config = self.parse(&source[body_start..body_end])?;
            config.animation.breakpoint = name.to_string();
            variants.insert(name.to_string(), config);
        }

        Ok(variants)
    }

    fn parse_body(&self, body: &str, config: &mut StaggerConfig) {
        let (forced_timeline, body) = match body.strip_prefix("timeline:") {
            Some(rest) => (true, rest),
            None => (false, body),
        };

        let steps: Vec<(&str, String)> = split_steps(body)
            .into_iter()
            .filter_map(|step| step.trim().split_once(':'))
            .map(|(marker, props)| (marker.trim(), self.take_stagger_delay(props, config)))
            .collect();

        let from_to_only = steps.iter().all(|(marker, _)| matches!(*marker, "from" | "to"));
        if from_to_only && !forced_timeline {
            for (marker, props) in &steps {
                let target = if *marker == "from" {
                    &mut config.animation.from
                } else {
                    &mut config.animation.to
                };
                target.extend(parse_properties(props, &self.resolver));
            }
            return;
        }

        let mut timeline: Vec<TimelineStep> = steps
            .iter()
            .filter_map(|(marker, props)| {
                Some(TimelineStep {
                    at: parse_marker(marker)?,
                    properties: parse_properties(props, &self.resolver),
                })
            })
            .collect();
        timeline.sort_by(|a, b| a.at.total_cmp(&b.at));
        config.animation.timeline = Some(timeline);
    }

    /// Strip `stagger-N` tokens from a property list, recording the delay.
    fn take_stagger_delay(&self, props: &str, config: &mut StaggerConfig) -> String {
        let mut kept = Vec::new();
        for token in property_tokens(props) {
            match token.strip_prefix(STAGGER_PREFIX) {
                Some(raw) => config.stagger_delay = parse_delay(raw),
                None => kept.push(token),
            }
        }
        kept.join("|")
    }
}

fn parse_delay(raw: &str) -> f64 {
    match parse_float_prefix(raw) {
        Some(delay) if delay.is_finite() && delay >= 0.0 => delay,
        _ => {
            warn!(value = raw, "invalid stagger delay, using default");
            DEFAULT_STAGGER_DELAY
        }
    }
}

/// Split steps on `;`, or on whitespace before a step marker when there is
/// no `;`.
fn split_steps(body: &str) -> Vec<&str> {
    if body.contains(';') {
        return body.split(';').collect();
    }
    let mut steps = Vec::new();
    let mut start = 0;
    for caps in STEP_RE.captures_iter(body) {
        let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        steps.push(&body[start..whole.start()]);
        start = marker.start();
    }
    steps.push(&body[start..]);
    steps
}

/// Split `[selector]:rest` into the unescaped selector and `rest`.
pub fn split_selector(source: &str) -> ParseResult<(String, &str)> {
    let unterminated = || ParseError::UnterminatedSelector(source.to_string());
    let inner = source.strip_prefix('[').ok_or_else(unterminated)?;

    let mut selector = String::new();
    let mut chars = inner.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' if inner[index + 1..].starts_with(']') => {
                selector.push(']');
                chars.next();
            }
            ']' => {
                let rest = inner[index + 1..].strip_prefix(':').ok_or_else(unterminated)?;
                let selector = selector.strip_prefix('&').unwrap_or(&selector).trim();
                if selector.is_empty() {
                    return Err(ParseError::EmptySelector);
                }
                return Ok((selector.to_string(), rest));
            }
            _ => selector.push(c),
        }
    }
    Err(unterminated())
}
