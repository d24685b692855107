//! Error types for sensor fetches.

use thiserror::Error;

/// Errors that can occur while fetching a sensor snapshot.
///
/// Every variant is recoverable: the poll loop turns it into a
/// disconnected status and retries after a backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection broke.
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("API returned status {status}")]
    Http { status: u16 },

    /// The body was not the expected envelope, or it reported no data.
    #[error("Invalid payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Payload(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.to_string())
    }
}
