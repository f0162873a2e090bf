//! Error types for the scroll animation engine.

use thiserror::Error;

/// Result type for descriptor parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing a descriptor.
///
/// These never escape the orchestrator: the element that carried the
/// descriptor simply ends up without an animation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A stagger descriptor opened `[` without a matching `]:`.
    #[error("unterminated selector in stagger descriptor: {0}")]
    UnterminatedSelector(String),

    /// A stagger descriptor has an empty `[]` selector.
    #[error("empty selector in stagger descriptor")]
    EmptySelector,

    /// A breakpoint segment has no `:` after its `@name`.
    #[error("breakpoint segment `{0}` is missing a `:`")]
    MalformedBreakpoint(String),

    /// A media query uses a feature other than `min-width`/`max-width`.
    #[error("unsupported media query: {0}")]
    UnsupportedMediaQuery(String),

    /// A modifier carried a value that does not fit its type.
    #[error("invalid value for `{modifier}`: {value}")]
    InvalidModifier {
        modifier: &'static str,
        value: String,
    },
}

/// Errors reported by a host while applying a style.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    /// The host refused the property/value pair.
    #[error("style `{property}` rejected: {reason}")]
    Rejected { property: String, reason: String },

    /// The element is no longer attached to the host document.
    #[error("element is detached")]
    Detached,
}

/// Errors raised by a feature module lifecycle hook.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    #[error("module `{module}` failed: {message}")]
    Failed { module: String, message: String },
}

impl ModuleError {
    pub fn failed(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            module: module.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by plugin and module registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A property plugin with this name is already registered.
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    /// A feature module with this name is already registered.
    #[error("module `{0}` is already registered")]
    DuplicateModule(String),
}

/// Errors raised while building a [`crate::MotionManager`].
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] scrolly_config::ConfigError),
}
