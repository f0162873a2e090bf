//! Shared page theme.
//!
//! The theme lives in one [`ThemeContext`] owned by the manager and handed to
//! modules through their context. It is mirrored onto the document root as
//! `data-theme` and every change is announced with a `ThemeChange` event.

use tracing::debug;

use crate::events::{EventQueue, MotionEvent};
use crate::host::StyleSink;

/// Root attribute carrying the active theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeContext {
    active: Option<String>,
}

impl ThemeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switch to `theme`. Returns whether anything changed.
    pub fn set<S: StyleSink + ?Sized>(&mut self, theme: Option<&str>, sink: &mut S, events: &mut EventQueue) -> bool {
        if self.active.as_deref() == theme {
            return false;
        }
        debug!(from = ?self.active, to = ?theme, "theme change");
        self.active = theme.map(str::to_string);
        sink.set_root_attribute(THEME_ATTRIBUTE, theme);
        events.push(MotionEvent::ThemeChange {
            theme: self.active.clone(),
        });
        true
    }

    /// Forget the active theme without touching the document.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;

    #[test]
    fn test_set_writes_root_and_emits_once() {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let mut events = EventQueue::new();
        let mut theme = ThemeContext::new();

        assert!(theme.set(Some("dark"), &mut doc, &mut events));
        assert!(!theme.set(Some("dark"), &mut doc, &mut events));
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE), Some("dark"));
        assert_eq!(events.len(), 1);

        assert!(theme.set(None, &mut doc, &mut events));
        assert_eq!(doc.root_attribute(THEME_ATTRIBUTE), None);
        assert_eq!(
            events.drain().collect::<Vec<_>>(),
            vec![
                MotionEvent::ThemeChange {
                    theme: Some("dark".into())
                },
                MotionEvent::ThemeChange { theme: None },
            ]
        );
        assert_eq!(theme.active(), None);
    }
}
