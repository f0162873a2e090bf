//! Responsive breakpoint selection.
//!
//! Descriptors may carry one variant per breakpoint (`@mobile:...`). Exactly
//! one variant is active per measurement pass, picked by the fixed priority
//! order [`BREAKPOINT_ORDER`] against live viewport conditions.

use indexmap::IndexMap;
use tracing::warn;

use crate::error::{ParseError, ParseResult};

/// Breakpoint names from highest to lowest priority.
pub const BREAKPOINT_ORDER: [&str; 5] = ["large", "desktop", "tablet", "mobile", "default"];

/// Name of the fallback breakpoint.
pub const DEFAULT_BREAKPOINT: &str = "default";

/// Live boolean viewport conditions keyed by breakpoint name.
pub trait ViewportConditions {
    fn matches(&self, breakpoint: &str) -> bool;
}

impl<F> ViewportConditions for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, breakpoint: &str) -> bool {
        self(breakpoint)
    }
}

/// Conditions under which no named breakpoint holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConditions;

impl ViewportConditions for NoConditions {
    fn matches(&self, _breakpoint: &str) -> bool {
        false
    }
}

/// Pick the active entry of a per-breakpoint map.
///
/// Returns the first entry in priority order whose condition holds, else the
/// `default` entry, else `None`. Map insertion order is irrelevant.
pub fn resolve<'m, T>(
    variants: &'m IndexMap<String, T>,
    conditions: &dyn ViewportConditions,
) -> Option<&'m T> {
    BREAKPOINT_ORDER
        .iter()
        .filter_map(|name| variants.get(*name).map(|variant| (*name, variant)))
        .find(|(name, _)| conditions.matches(name))
        .map(|(_, variant)| variant)
        .or_else(|| variants.get(DEFAULT_BREAKPOINT))
}

/// Width range parsed from `(min-width: Npx) and (max-width: Npx)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MediaQuery {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
}

impl MediaQuery {
    pub fn parse(source: &str) -> ParseResult<Self> {
        let unsupported = || ParseError::UnsupportedMediaQuery(source.to_string());
        let mut query = Self::default();

        for clause in source.split(" and ") {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            let inner = clause
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
                .ok_or_else(unsupported)?;
            let (feature, value) = inner.split_once(':').ok_or_else(unsupported)?;
            let value = value.trim();
            let pixels = value
                .strip_suffix("px")
                .unwrap_or(value)
                .trim()
                .parse::<f64>()
                .map_err(|_| unsupported())?;

            match feature.trim() {
                "min-width" => query.min_width = Some(pixels),
                "max-width" => query.max_width = Some(pixels),
                _ => return Err(unsupported()),
            }
        }

        if query.min_width.is_none() && query.max_width.is_none() {
            return Err(unsupported());
        }
        Ok(query)
    }

    pub fn matches(&self, width: f64) -> bool {
        self.min_width.is_none_or(|min| width >= min) && self.max_width.is_none_or(|max| width <= max)
    }
}

/// Configured breakpoint queries evaluated against a viewport width.
#[derive(Debug, Clone, Default)]
pub struct WidthConditions {
    queries: IndexMap<String, MediaQuery>,
    width: f64,
}

impl WidthConditions {
    /// Parse every configured query. Unsupported queries are logged and
    /// never match.
    pub fn from_queries(breakpoints: &IndexMap<String, String>) -> Self {
        let mut queries = IndexMap::new();
        for (name, source) in breakpoints {
            match MediaQuery::parse(source) {
                Ok(query) => {
                    queries.insert(name.clone(), query);
                }
                Err(err) => warn!(breakpoint = %name, %err, "ignoring breakpoint"),
            }
        }
        Self { queries, width: 0.0 }
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Names of the breakpoints whose query currently holds.
    pub fn active(&self) -> Vec<&str> {
        self.queries
            .iter()
            .filter(|(_, q)| q.matches(self.width))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl ViewportConditions for WidthConditions {
    fn matches(&self, breakpoint: &str) -> bool {
        self.queries
            .get(breakpoint)
            .is_some_and(|query| query.matches(self.width))
    }
}
