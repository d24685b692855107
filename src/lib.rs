//! # envwatch
//!
//! A terminal dashboard and library for environmental sensors (temperature,
//! humidity, CO₂, particulates, formaldehyde, battery).
//!
//! The dashboard polls a sensor API, classifies every reading into a health
//! level, keeps a short rolling history per sensor for sparklines and
//! charts, and backs off exponentially while the API is unreachable.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │(classify)│    │(render) │    │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │ watch                                               │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌─────────┐                                 │
//! │  │  poll   │───▶│ source  │◀── HttpSource | FileSource      │
//! │  │ (tasks) │    │ (input) │                                 │
//! │  └─────────┘    └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`SensorSource`] trait with HTTP and file implementations
//! - **[`poll`]**: Backoff, the poll state machine, and the tokio tasks driving it
//! - **[`data`]**: Classification, the sensor catalog, history windows, chart mapping
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Dashboard state, key handling and rendering
//! - **[`config`]**, **[`prefs`]**, **[`export`]**: Settings, persisted theme, JSON export
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard against the default API
//! envwatch
//!
//! # Replay a captured response
//! envwatch --file sensors.json
//!
//! # Print one classified snapshot and exit
//! envwatch --once
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use envwatch::{FileSource, PollConfig, PollHandle};
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(FileSource::new("sensors.json"));
//! let handle = PollHandle::spawn(source, PollConfig::default());
//!
//! let mut updates = handle.subscribe();
//! updates.changed().await.unwrap();
//! println!("{}", updates.borrow().status.message);
//!
//! handle.shutdown().await;
//! # });
//! ```
//!
//! ### Classifying a reading
//!
//! ```
//! use envwatch::{classify, HealthStatus, SensorReading, SensorValue};
//!
//! let reading = SensorReading::new("co2_value", SensorValue::Number(1200.0));
//! let class = classify(&reading);
//! assert_eq!(class.level, HealthStatus::Critical);
//! assert_eq!(class.note, "Ventilación");
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod poll;
pub mod prefs;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{classify, Classification, HealthStatus, History, LevelCounts, SensorKind};
pub use error::FetchError;
pub use poll::{DashboardState, PollConfig, PollHandle, PollState, Visibility};
pub use prefs::{PreferenceStore, Preferences, ThemePreference};
pub use source::{FileSource, HttpSource, SensorReading, SensorSnapshot, SensorSource, SensorValue};
