//! Custom property plugins.
//!
//! A plugin gets the first chance at resolving a `(property, raw token)` pair
//! before the built-in shorthand table. Plugins are tried in registration
//! order and the first `Some` wins.

use std::fmt;

use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::types::AnimValue;

/// A named resolver for custom properties.
pub trait PropertyPlugin: Send {
    fn name(&self) -> &str;

    /// Resolve `raw` for `property`, or `None` to defer to the next resolver.
    fn parse(&self, property: &str, raw: &str) -> Option<AnimValue>;
}

/// Adapter turning a closure into a [`PropertyPlugin`].
pub struct FnPlugin<F> {
    name: String,
    parse: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&str, &str) -> Option<AnimValue> + Send,
{
    pub fn new(name: impl Into<String>, parse: F) -> Self {
        Self {
            name: name.into(),
            parse,
        }
    }
}

impl<F> PropertyPlugin for FnPlugin<F>
where
    F: Fn(&str, &str) -> Option<AnimValue> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, property: &str, raw: &str) -> Option<AnimValue> {
        (self.parse)(property, raw)
    }
}

/// Ordered set of registered plugins, unique by name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn PropertyPlugin>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A second plugin with the same name is rejected and
    /// the first registration stays in effect.
    pub fn register(&mut self, plugin: Box<dyn PropertyPlugin>) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if self.contains(&name) {
            warn!(plugin = %name, "plugin already registered, keeping the first");
            return Err(RegistryError::DuplicatePlugin(name));
        }
        debug!(plugin = %name, "registered property plugin");
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// First non-`None` plugin result for this pair.
    pub fn resolve(&self, property: &str, raw: &str) -> Option<AnimValue> {
        self.plugins.iter().find_map(|p| p.parse(property, raw))
    }
}
