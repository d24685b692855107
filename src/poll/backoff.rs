//! Exponential backoff between failed polls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff parameters, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Interval after a success, and the starting point for growth.
    pub floor_ms: u64,
    /// Upper bound for the interval.
    pub ceiling_ms: u64,
    /// Multiplier applied on each consecutive failure.
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            floor_ms: 3_000,
            ceiling_ms: 20_000,
            factor: 1.6,
        }
    }
}

/// Current backoff interval.
///
/// Grows by `factor` on every failure up to `ceiling_ms` and drops back to
/// `floor_ms` on any success. The value is kept as fractional milliseconds
/// so repeated growth does not accumulate rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    policy: BackoffPolicy,
    current_ms: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current_ms: policy.floor_ms as f64,
            policy,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn current(&self) -> Duration {
        Duration::from_micros((self.current_ms * 1_000.0).round() as u64)
    }

    pub fn reset(&mut self) {
        self.current_ms = self.policy.floor_ms as f64;
    }

    pub fn grow(&mut self) {
        let ceiling = self.policy.ceiling_ms.max(self.policy.floor_ms) as f64;
        self.current_ms = (self.current_ms * self.policy.factor.max(1.0)).min(ceiling);
    }
}
