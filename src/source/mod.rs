//! Data source abstraction for fetching sensor snapshots.
//!
//! The poll loop talks to a [`SensorSource`]; the dashboard normally uses
//! [`HttpSource`] against the live API, while [`FileSource`] replays a
//! captured response for demos and offline inspection.

mod file;
mod http;
mod snapshot;

pub use file::FileSource;
pub use http::{HttpSource, SENSORS_PATH};
pub use snapshot::{SensorReading, SensorSnapshot, SensorValue, SensorsResponse};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait for fetching sensor snapshots from various sources.
///
/// Each call performs one fetch and reports the outcome; retry and backoff
/// are the caller's concern.
///
/// # Example
///
/// ```no_run
/// use envwatch::{HttpSource, SensorSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::new("https://apisensor-production.up.railway.app").unwrap();
/// match source.fetch().await {
///     Ok(snapshot) => println!("Got {} sensors", snapshot.len()),
///     Err(e) => println!("Fetch failed: {}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait SensorSource: Send + Sync + Debug {
    /// Fetch the current snapshot, bypassing any cache.
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the dashboard header.
    fn description(&self) -> &str;
}
