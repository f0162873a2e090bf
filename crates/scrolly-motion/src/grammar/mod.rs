//! Descriptor grammars.
//!
//! Two descriptor shapes exist:
//! - animation: `[@breakpoint:]from:opacity-0 to:opacity-100` or a timeline
//! - stagger: `[selector]:from:...;to:...|stagger-0.2`, optionally chained as
//!   `@breakpoint:[selector]:...`
//!
//! A descriptor is a stagger descriptor exactly when it begins with `[` or
//! with `@name:[`.

pub mod animation;
pub mod stagger;

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::breakpoint::{self, ViewportConditions};
use crate::error::{ParseError, ParseResult};
use crate::types::{AnimationConfig, ResolvedAnimation, TimelineStep};
use crate::value::ValueResolver;

pub use animation::AnimationParser;
pub use stagger::StaggerParser;

/// Named timelines that `preset:NAME` can refer to.
pub type Presets = IndexMap<String, Vec<TimelineStep>>;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"transition-duration-(\d+)").expect("valid regex"));
static EASING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"transition-easing-([a-zA-Z-]+)").expect("valid regex"));
static STAGGER_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[^:\[\]\s]+:\[").expect("valid regex"));

/// Free-floating transition modifiers found anywhere in a descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionModifiers {
    pub duration: Option<u32>,
    pub easing: Option<String>,
}

impl TransitionModifiers {
    /// First `transition-duration-N` and `transition-easing-NAME` in `source`.
    pub fn scan(source: &str) -> ParseResult<Self> {
        let duration = match DURATION_RE.captures(source) {
            Some(caps) => {
                let digits = &caps[1];
                Some(
                    digits
                        .parse::<u32>()
                        .map_err(|_| ParseError::InvalidModifier {
                            modifier: "transition-duration",
                            value: digits.to_string(),
                        })?,
                )
            }
            None => None,
        };
        let easing = EASING_RE.captures(source).map(|caps| caps[1].to_string());
        Ok(Self { duration, easing })
    }

    pub fn apply(&self, config: &mut AnimationConfig) {
        if let Some(duration) = self.duration {
            config.transition_duration = Some(duration);
        }
        if let Some(easing) = &self.easing {
            config.transition_easing = Some(easing.clone());
        }
    }
}

/// True when `source` must be parsed with the stagger grammar.
pub fn is_stagger_descriptor(source: &str) -> bool {
    let source = source.trim_start();
    source.starts_with('[') || STAGGER_HEAD_RE.is_match(source)
}

/// Parse any descriptor and pick the variant active under `conditions`.
///
/// `Ok(None)` means the descriptor is well-formed but no breakpoint variant
/// applies.
pub fn parse_descriptor(
    source: &str,
    resolver: ValueResolver<'_>,
    presets: &Presets,
    conditions: &dyn ViewportConditions,
) -> ParseResult<Option<ResolvedAnimation>> {
    if is_stagger_descriptor(source) {
        let variants = StaggerParser::new(resolver).parse_breakpoints(source)?;
        Ok(breakpoint::resolve(&variants, conditions)
            .cloned()
            .map(ResolvedAnimation::Stagger))
    } else {
        let parser = AnimationParser::new(resolver, presets);
        Ok(parser.parse(source, conditions)?.map(ResolvedAnimation::Simple))
    }
}
