use std::thread;

use crate::types::{Result, SkeletonError};

/// Tuning knobs for a skeleton run.
#[derive(Debug, Clone)]
pub struct SkeletonConfig {
    /// Significance level of the conditional independence tests. An edge is
    /// removed when a test returns a p-value at or above this threshold.
    pub alpha: f64,
    /// Number of worker threads draining the per-level test queue.
    pub workers: usize,
    /// Largest conditioning-set size to examine. `None` runs until no node
    /// has enough neighbors to continue.
    pub max_level: Option<usize>,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            max_level: None,
        }
    }
}

impl SkeletonConfig {
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    pub fn single_threaded() -> Self {
        Self {
            workers: 1,
            ..Self::default()
        }
    }

    /// Conservative preset for high-dimensional screens.
    pub fn strict() -> Self {
        Self {
            alpha: 0.01,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(SkeletonError::InvalidAlpha(self.alpha));
        }
        if self.workers == 0 {
            return Err(SkeletonError::Invalid("worker count must be at least 1"));
        }
        Ok(())
    }
}
