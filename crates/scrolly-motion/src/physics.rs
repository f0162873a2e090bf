//! Progress smoothing.
//!
//! While the page is actively scrolling a damped element pursues its target
//! progress (`current = current * (1 - damping) + target * damping`). Once
//! scrolling goes quiet it coasts: velocity decays by friction and is pulled
//! back toward the target by a weak attraction.

use serde::{Deserialize, Serialize};

/// Reference frame duration in milliseconds; `dt` is expressed in frames of this length.
pub const FRAME_BUDGET_MS: f64 = 16.67;
/// Attraction toward the target applied per frame in momentum mode.
pub const ATTRACTION: f64 = 0.015;
/// Progress difference under which an element counts as settled.
pub const MIN_PROGRESS_DIFF: f64 = 0.001;
/// Velocity under which an element counts as settled.
pub const MIN_VELOCITY: f64 = 0.001;
/// Share of the last target change captured as velocity while scrolling.
pub const VELOCITY_SCALE: f64 = 0.5;

/// Per-element smoothing state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub target: f64,
    pub current: f64,
    pub velocity: f64,
    pub last_target: f64,
    pub damping: f64,
    pub friction: f64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(0.0, crate::threshold::DEFAULT_FRICTION)
    }
}

impl ProgressState {
    pub fn new(damping: f64, friction: f64) -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            velocity: 0.0,
            last_target: 0.0,
            damping,
            friction,
        }
    }

    pub fn is_damped(&self) -> bool {
        self.damping > 0.0
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Advance one frame of `dt_ms` and report whether another frame is needed.
    ///
    /// `dt_ms` is clamped to `[0, FRAME_BUDGET_MS]`. An undamped element
    /// snaps straight to its target.
    pub fn step(&mut self, scrolling: bool, dt_ms: f64) -> bool {
        if !self.is_damped() {
            self.current = self.target;
            self.velocity = 0.0;
            self.last_target = self.target;
            return false;
        }

        let frames = dt_ms.clamp(0.0, FRAME_BUDGET_MS) / FRAME_BUDGET_MS;
        let target_delta = self.target - self.last_target;
        self.last_target = self.target;

        if scrolling {
            if target_delta.abs() > MIN_PROGRESS_DIFF {
                self.velocity = target_delta * VELOCITY_SCALE;
            }
            self.current = self.current * (1.0 - self.damping) + self.target * self.damping;
        } else {
            self.velocity *= self.friction.powf(frames);
            self.velocity += (self.target - self.current) * ATTRACTION * frames;
            self.current += self.velocity * frames;
        }
        self.current = self.current.clamp(0.0, 1.0);

        if self.is_settled() {
            self.current = self.target;
            self.velocity = 0.0;
            return false;
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.current).abs() <= MIN_PROGRESS_DIFF && self.velocity.abs() <= MIN_VELOCITY
    }

    /// Drop all motion and jump to `progress`.
    pub fn reset(&mut self, progress: f64) {
        self.target = progress;
        self.current = progress;
        self.last_target = progress;
        self.velocity = 0.0;
    }
}
