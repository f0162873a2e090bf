//! Distribution of one parent progress over ordered children.
//!
//! With `n` children and delay `d`, the total stagger time is `T = (n-1)*d`
//! and child `i` ramps 0 → 1 over the window
//! `[i*d / (1+T), i*d / (1+T) + 1 / (1+T)]` of parent progress. The last
//! window ends exactly at 1, so every child is complete at full progress.

use crate::interpolate::interpolate_config;
use crate::types::{PropertyMap, StaggerConfig};

/// Per-child progress windows for a stagger group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaggerDistributor {
    count: usize,
    delay: f64,
}

impl StaggerDistributor {
    pub fn new(count: usize, delay: f64) -> Self {
        Self {
            count,
            delay: delay.max(0.0),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn total_time(&self) -> f64 {
        self.count.saturating_sub(1) as f64 * self.delay
    }

    /// Start and end of slot `slot`'s window in parent progress.
    pub fn window(&self, slot: usize) -> (f64, f64) {
        let scale = 1.0 + self.total_time();
        let start = slot as f64 * self.delay / scale;
        (start, start + 1.0 / scale)
    }

    fn ramp(&self, slot: usize, progress: f64) -> f64 {
        if progress >= 1.0 {
            return 1.0;
        }
        let (start, end) = self.window(slot);
        if progress < start {
            return 0.0;
        }
        ((progress - start) / (end - start)).min(1.0)
    }

    /// Progress of child `index` for parent `progress`.
    ///
    /// Positive progress plays forward. Negative progress plays the exit in
    /// reverse index order, unless `once` is set, in which case children stay
    /// complete. Zero progress leaves every child at 0.
    pub fn child_progress(&self, index: usize, progress: f64, once: bool) -> f64 {
        if index >= self.count {
            return 0.0;
        }
        if progress > 0.0 {
            self.ramp(index, progress)
        } else if progress < 0.0 {
            if once {
                return 1.0;
            }
            let reverse = self.count - 1 - index;
            let (start, _) = self.window(reverse);
            let exiting = progress.abs();
            if exiting >= start {
                1.0 - self.ramp(reverse, exiting)
            } else {
                1.0
            }
        } else {
            0.0
        }
    }

    /// Progress of every child, in order.
    pub fn distribute(&self, progress: f64, once: bool) -> Vec<f64> {
        (0..self.count)
            .map(|index| self.child_progress(index, progress, once))
            .collect()
    }
}

/// Current values for each child of a stagger group.
pub fn stagger_values(config: &StaggerConfig, children: usize, progress: f64, once: bool) -> Vec<PropertyMap> {
    StaggerDistributor::new(children, config.stagger_delay)
        .distribute(progress, once)
        .into_iter()
        .map(|child| interpolate_config(&config.animation, child))
        .collect()
}
