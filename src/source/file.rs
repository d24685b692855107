//! File-based data source.
//!
//! Replays a captured API response from disk. The file is re-read on
//! every fetch, so editing it while the dashboard runs behaves like a
//! changing server.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{SensorSource, SensorSnapshot, SensorsResponse};
use crate::error::FetchError;

/// A data source that reads the sensors envelope from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SensorSource for FileSource {
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Network(format!("Read error: {}", e)))?;
        SensorsResponse::parse(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
