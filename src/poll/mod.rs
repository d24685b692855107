//! Polling engine: backoff, the poll state machine and its async driver.
//!
//! ```text
//!  Idle ──▶ Polling ──▶ Success ─┐
//!              ▲    └──▶ Failure ─┤
//!              │                  ▼
//!              └────────────── Scheduled (backoff | hidden interval | refresh)
//! ```
//!
//! - [`backoff`]: exponential backoff between failures
//! - [`state`]: [`PollState`], the transition functions and the published [`DashboardState`]
//! - [`driver`]: [`PollHandle`], the tokio tasks running the loop and the clock

pub mod backoff;
pub mod driver;
pub mod state;

pub use backoff::{Backoff, BackoffPolicy};
pub use driver::{format_clock, PollCommand, PollHandle, CLOCK_PLACEHOLDER};
pub use state::{ConnectionStatus, DashboardState, PollState};

use std::time::Duration;

use crate::data::DEFAULT_MAX_POINTS;

/// Whether the dashboard is currently being looked at.
///
/// In the terminal this follows window focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Timing and retention parameters for the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub backoff: BackoffPolicy,
    /// Fixed interval used while the dashboard is hidden.
    pub hidden_interval: Duration,
    /// Period of the clock ticker.
    pub clock_interval: Duration,
    /// History window length per sensor.
    pub max_points: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            hidden_interval: Duration::from_millis(10_000),
            clock_interval: Duration::from_secs(1),
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}
