//! Animation descriptor parser.
//!
//! ```text
//! from:opacity-0|translateY-10 to:opacity-100 @desktop:from:scale-90;via-50%:scale-110;to:scale-100
//! ```
//!
//! The descriptor is cut into breakpoint segments before every `@`; text
//! ahead of the first `@` belongs to `default`. A segment whose body holds a
//! `;` together with a `from:`, `via-` or `to:` marker is a timeline;
//! anything else is a set of `from:` / `to:` / `timeline:` / `preset:`
//! sections.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use super::{Presets, TransitionModifiers};
use crate::breakpoint::{self, DEFAULT_BREAKPOINT, ViewportConditions};
use crate::error::{ParseError, ParseResult};
use crate::timeline::{parse_properties, parse_timeline};
use crate::types::AnimationConfig;
use crate::value::ValueResolver;

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(from|to|timeline|preset):").expect("section regex"));

/// Parses animation descriptors into per-breakpoint [`AnimationConfig`]s.
pub struct AnimationParser<'a> {
    resolver: ValueResolver<'a>,
    presets: &'a Presets,
}

impl<'a> AnimationParser<'a> {
    pub fn new(resolver: ValueResolver<'a>, presets: &'a Presets) -> Self {
        Self { resolver, presets }
    }

    /// Parse `source` and return the variant active under `conditions`, with
    /// transition modifiers applied.
    pub fn parse(
        &self,
        source: &str,
        conditions: &dyn ViewportConditions,
    ) -> ParseResult<Option<AnimationConfig>> {
        if source.trim().is_empty() {
            return Ok(None);
        }
        let modifiers = TransitionModifiers::scan(source)?;
        let variants = self.parse_breakpoints(source)?;

        Ok(breakpoint::resolve(&variants, conditions).cloned().map(|mut config| {
            modifiers.apply(&mut config);
            config
        }))
    }

    /// Every breakpoint variant in `source`, keyed by breakpoint name.
    ///
    /// Repeated segments for the same breakpoint merge into one config.
    pub fn parse_breakpoints(&self, source: &str) -> ParseResult<IndexMap<String, AnimationConfig>> {
        let mut variants: IndexMap<String, AnimationConfig> = IndexMap::new();

        for segment in split_at_markers(source.trim()) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, body) = match segment.strip_prefix('@') {
                Some(rest) => rest
                    .split_once(':')
                    .ok_or_else(|| ParseError::MalformedBreakpoint(segment.to_string()))?,
                None => (DEFAULT_BREAKPOINT, segment),
            };

            let config = variants
                .entry(name.to_string())
                .or_insert_with(|| AnimationConfig::new(name));
            self.parse_body(body, config);
        }

        Ok(variants)
    }

    fn parse_body(&self, body: &str, config: &mut AnimationConfig) {
        let body = body.trim();
        if is_timeline_body(body) {
            let steps = body.strip_prefix("timeline:").unwrap_or(body);
            config.timeline = Some(parse_timeline(steps, &self.resolver));
            return;
        }

        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            for section in split_sections(part) {
                self.parse_section(section.trim(), config);
            }
        }
    }

    fn parse_section(&self, section: &str, config: &mut AnimationConfig) {
        if let Some(props) = section.strip_prefix("from:") {
            config.from.extend(parse_properties(props, &self.resolver));
        } else if let Some(props) = section.strip_prefix("to:") {
            config.to.extend(parse_properties(props, &self.resolver));
        } else if let Some(steps) = section.strip_prefix("timeline:") {
            config.timeline = Some(parse_timeline(steps, &self.resolver));
        } else if let Some(name) = section.strip_prefix("preset:") {
            let name = name.trim();
            match self.presets.get(name) {
                Some(steps) => config.timeline = Some(steps.clone()),
                None => warn!(preset = %name, "unknown preset"),
            }
        } else if !section.starts_with("transition-") {
            debug!(section, "ignoring unrecognised animation section");
        }
    }
}

/// Timeline mode: a `;` plus a literal step marker.
fn is_timeline_body(body: &str) -> bool {
    body.contains(';') && (body.contains("from:") || body.contains("via-") || body.contains("to:"))
}

/// Cut before every `@`.
fn split_at_markers(source: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, _) in source.match_indices('@') {
        if index > start {
            segments.push(&source[start..index]);
        }
        start = index;
    }
    segments.push(&source[start..]);
    segments
}

/// Cut before whitespace that precedes a section marker.
fn split_sections(part: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    for caps in SECTION_RE.captures_iter(part) {
        let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        sections.push(&part[start..whole.start()]);
        start = marker.start();
    }
    sections.push(&part[start..]);
    sections
}
