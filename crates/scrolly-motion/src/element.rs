//! Per-element state kept by the manager.
//!
//! The host owns its elements; the manager only keeps this side table keyed
//! by [`ElementId`]. Everything in it is dropped when the element is
//! untracked.

use serde::{Deserialize, Serialize};

use crate::physics::ProgressState;
use crate::threshold::{ScrollConfig, Thresholds};
use crate::types::{ElementId, ResolvedAnimation};

/// The descriptor strings an element carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptors {
    /// Scroll config (`enter:10vh;exit:40vh;...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<String>,
    /// Animation or stagger descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

impl ElementDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll(mut self, scroll: impl Into<String>) -> Self {
        self.scroll = Some(scroll.into());
        self
    }

    pub fn animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scroll.is_none() && self.animation.is_none()
    }
}

/// Everything the manager knows about one tracked element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementState {
    pub descriptors: ElementDescriptors,
    pub scroll: ScrollConfig,
    pub thresholds: Thresholds,
    pub progress: ProgressState,
    pub animation: Option<ResolvedAnimation>,
    /// Stagger children, in document order.
    pub children: Vec<ElementId>,
    /// Reported by the host's viewport-intersection notifier.
    pub intersecting: bool,
    pub in_view: bool,
    /// Set the first time the element comes into view and never cleared.
    pub has_entered_once: bool,
    /// A `once` element that entered and left; it receives no more updates.
    pub frozen: bool,
    pub measured: bool,
    /// Progress last written to the host.
    pub last_applied: Option<f64>,
}

impl ElementState {
    pub fn new(descriptors: ElementDescriptors) -> Self {
        Self {
            descriptors,
            scroll: ScrollConfig::parse(""),
            thresholds: Thresholds::default(),
            progress: ProgressState::default(),
            animation: None,
            children: Vec::new(),
            intersecting: false,
            in_view: false,
            has_entered_once: false,
            frozen: false,
            measured: false,
            last_applied: None,
        }
    }

    /// Whether the element takes part in frame updates at all.
    pub fn is_live(&self) -> bool {
        self.measured && !self.frozen
    }

    /// Whether smoothing still has work to do.
    pub fn is_moving(&self) -> bool {
        self.is_live() && self.progress.is_damped() && !self.progress.is_settled()
    }

    /// Whether this frame should touch the element.
    ///
    /// An element still marked in view gets updated after it stops
    /// intersecting so its leave is observed.
    pub fn wants_update(&self) -> bool {
        self.is_live() && (self.intersecting || self.in_view || self.is_moving())
    }
}
