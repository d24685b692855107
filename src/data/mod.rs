//! Data models and processing for sensor snapshots.
//!
//! This module turns raw snapshots into what the dashboard shows.
//!
//! ## Submodules
//!
//! - [`catalog`]: Display rules per sensor code (titles, units, descriptions, ranges)
//! - [`chart`]: Point-to-path mapping, sparklines, trend and series stats
//! - [`classify`]: Health classification ([`HealthStatus`], [`Classification`])
//! - [`history`]: Rolling per-sensor windows for sparklines and the detail chart
//!
//! ## Data Flow
//!
//! ```text
//! SensorSnapshot (raw JSON)
//!        │
//!        ├──▶ classify() per reading ──▶ LevelCounts (status overview)
//!        │
//!        └──▶ History::record() ──▶ chart::path / sparkline
//! ```

pub mod catalog;
pub mod chart;
pub mod classify;
pub mod history;

pub use catalog::SensorKind;
pub use chart::{Bounds, SeriesStats, Trend};
pub use classify::{classify, Classification, HealthStatus, LevelCounts};
pub use history::{History, DEFAULT_MAX_POINTS};
