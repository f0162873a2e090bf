//! Scrolly configuration system
//!
//! This crate provides centralized configuration management for the scroll
//! animation engine, loading settings from `scrolly.toml` with environment
//! variable overrides.
//!
//! Structural errors (a top-level field of the wrong type) are fatal and
//! returned to the caller. Problems inside a single breakpoint or preset
//! entry only produce warnings; the offending entry is dropped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Default file name looked up by [`ScrollyConfig::load_or_default`].
pub const CONFIG_FILE: &str = "scrolly.toml";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("`{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollyConfig {
    /// Element selector hosts use to discover animated elements.
    pub selector: String,
    /// Enter offset used when an element's scroll config has no `enter` key.
    pub default_enter: String,
    /// Named media queries, keyed by breakpoint name.
    pub breakpoints: IndexMap<String, String>,
    /// Named timelines available to `preset:NAME` tokens.
    pub presets: IndexMap<String, PresetSource>,
    /// Scheduling windows.
    pub timing: TimingConfig,
}

/// Scheduling configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet window before a resize burst triggers re-measurement.
    pub resize_debounce_ms: f64,
    /// Quiet window after the last scroll notification before momentum mode.
    pub scroll_stop_ms: f64,
}

/// A preset timeline, either as descriptor text or as explicit steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetSource {
    /// Timeline grammar, e.g. `"from:opacity-0; to:opacity-100"`.
    Descriptor(String),
    /// Pre-resolved steps.
    Steps(Vec<PresetStep>),
}

/// One explicit preset step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetStep {
    pub at: f64,
    #[serde(default)]
    pub properties: IndexMap<String, PresetValue>,
}

/// A literal property value inside a preset step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetValue {
    Number(f64),
    Text(String),
}

/// Result of a successful load: the sanitized config and any non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: ScrollyConfig,
    pub warnings: Vec<String>,
}

impl Default for ScrollyConfig {
    fn default() -> Self {
        Self {
            selector: "[data-scroll], [data-animation]".to_string(),
            default_enter: "10vh".to_string(),
            breakpoints: default_breakpoints(),
            presets: IndexMap::new(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 200.0,
            scroll_stop_ms: 100.0,
        }
    }
}

/// The stock breakpoint table.
pub fn default_breakpoints() -> IndexMap<String, String> {
    [
        ("default", "(min-width: 1px)"),
        ("mobile", "(max-width: 767px)"),
        ("tablet", "(min-width: 768px) and (max-width: 1023px)"),
        ("desktop", "(min-width: 1024px)"),
    ]
    .into_iter()
    .map(|(name, query)| (name.to_string(), query.to_string()))
    .collect()
}

impl ScrollyConfig {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Returns
    /// * `Ok(LoadedConfig)` - sanitized configuration plus warnings for dropped entries
    /// * `Err(ConfigError)` - malformed TOML or a structural field of the wrong type
    pub fn from_toml_str(content: &str) -> Result<LoadedConfig, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let mut config = Self::default();
        let mut warnings = Vec::new();

        if let Some(value) = table.get("selector") {
            config.selector = value
                .as_str()
                .ok_or(ConfigError::InvalidField {
                    field: "selector",
                    expected: "a string",
                })?
                .to_string();
        }

        if let Some(value) = table.get("default_enter") {
            config.default_enter = value
                .as_str()
                .ok_or(ConfigError::InvalidField {
                    field: "default_enter",
                    expected: "a string",
                })?
                .to_string();
        }

        if let Some(value) = table.get("breakpoints") {
            let entries = value.as_table().ok_or(ConfigError::InvalidField {
                field: "breakpoints",
                expected: "a table",
            })?;
            config.breakpoints = IndexMap::new();
            for (name, query) in entries {
                match query.as_str() {
                    Some(query) => {
                        config.breakpoints.insert(name.clone(), query.to_string());
                    }
                    None => warnings.push(format!(
                        "breakpoint `{name}` has an invalid value; it must be a string"
                    )),
                }
            }
        }

        if let Some(value) = table.get("presets") {
            let entries = value.as_table().ok_or(ConfigError::InvalidField {
                field: "presets",
                expected: "a table",
            })?;
            for (name, preset) in entries {
                match preset.clone().try_into::<PresetSource>() {
                    Ok(source) => {
                        config.presets.insert(name.clone(), source);
                    }
                    Err(error) => warnings.push(format!(
                        "preset `{name}` has an invalid value; it must be a timeline string or an array of steps ({error})"
                    )),
                }
            }
        }

        if let Some(value) = table.get("timing") {
            config.timing = value
                .clone()
                .try_into::<TimingConfig>()
                .map_err(|_| ConfigError::InvalidField {
                    field: "timing",
                    expected: "a table of millisecond numbers",
                })?;
        }

        for warning in &warnings {
            warn!("scrolly config: {warning}");
        }

        Ok(LoadedConfig { config, warnings })
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<LoadedConfig, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location (scrolly.toml in the current directory)
    /// or return default configuration if the file doesn't exist or is invalid
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(loaded) => loaded.config,
            Err(ConfigError::Io(_)) => Self::default(),
            Err(error) => {
                warn!(%error, "ignoring invalid {CONFIG_FILE}");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(selector) = std::env::var("SCROLLY_SELECTOR") {
            self.selector = selector;
        }
        if let Ok(enter) = std::env::var("SCROLLY_DEFAULT_ENTER") {
            self.default_enter = enter;
        }
        if let Ok(val) = std::env::var("SCROLLY_RESIZE_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse::<f64>() {
                self.timing.resize_debounce_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("SCROLLY_SCROLL_STOP_MS") {
            if let Ok(ms) = val.parse::<f64>() {
                self.timing.scroll_stop_ms = ms;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from scrolly.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
