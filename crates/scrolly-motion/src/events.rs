//! Motion events for lifecycle callbacks.
//!
//! Events are queued while the manager processes a frame and drained by the
//! host afterwards:
//!
//! ```ignore
//! manager.on_frame(&mut document, now);
//! for event in manager.drain_events() {
//!     match event {
//!         MotionEvent::ElementEnter { element } => println!("{element} entered"),
//!         MotionEvent::ThemeChange { theme } => println!("theme -> {theme:?}"),
//!         _ => {}
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::ElementId;

/// Event emitted when an element or the shared theme changes state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionEvent {
    /// Element came into view for the first time since it last left.
    ElementEnter { element: ElementId },
    /// A previously entered element left the view.
    ElementLeave { element: ElementId },
    /// The active theme changed; `None` clears it.
    ThemeChange { theme: Option<String> },
}

impl MotionEvent {
    /// The element this event concerns, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::ElementEnter { element } | Self::ElementLeave { element } => Some(*element),
            Self::ThemeChange { .. } => None,
        }
    }

    pub fn is_enter(&self) -> bool {
        matches!(self, Self::ElementEnter { .. })
    }

    pub fn is_leave(&self) -> bool {
        matches!(self, Self::ElementLeave { .. })
    }
}

/// Queue for collecting events during update cycles.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<MotionEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MotionEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<MotionEvent> {
        self.events.pop_front()
    }

    /// Drain all events from the queue, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn peek(&self) -> Option<&MotionEvent> {
        self.events.front()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events for a specific element.
    pub fn events_for_element(&self, element: ElementId) -> Vec<&MotionEvent> {
        self.events
            .iter()
            .filter(|e| e.element() == Some(element))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_fifo() {
        let mut queue = EventQueue::new();
        let a = ElementId::from_raw(1);
        queue.push(MotionEvent::ElementEnter { element: a });
        queue.push(MotionEvent::ThemeChange {
            theme: Some("dark".into()),
        });
        queue.push(MotionEvent::ElementLeave { element: a });

        assert_eq!(queue.len(), 3);
        assert!(queue.peek().is_some_and(MotionEvent::is_enter));
        assert_eq!(queue.events_for_element(a).len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(drained[2].is_leave());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let event = MotionEvent::ThemeChange { theme: None };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"theme_change","theme":null}"#);

        let back: MotionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
