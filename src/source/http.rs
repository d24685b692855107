//! HTTP data source for the sensor API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tracing::debug;

use super::{SensorSource, SensorSnapshot, SensorsResponse};
use crate::error::FetchError;

/// Path of the formatted sensors endpoint, relative to the API base URL.
pub const SENSORS_PATH: &str = "/api/sensors/formatted";

/// A data source that polls the sensor API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    description: String,
}

impl HttpSource {
    /// Create a source for the given API base URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(8))
    }

    /// Create a source with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            url: format!("{}{}", base, SENSORS_PATH),
            description: base.to_string(),
        })
    }

    /// Returns the full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SensorSource for HttpSource {
    async fn fetch(&self) -> Result<SensorSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: SensorsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.to_string()))?;

        let snapshot = body.into_snapshot()?;
        debug!("Fetched {} sensors from {}", snapshot.len(), self.url);
        Ok(snapshot)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single request with a canned response.
    ///
    /// Returns the base URL and a task yielding the request head, lowercased.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (base, server)
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let source = HttpSource::new("http://localhost:8080/").unwrap();
        assert_eq!(source.url(), "http://localhost:8080/api/sensors/formatted");
        assert_eq!(source.description(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Nothing listens on the local discard port.
        let source =
            HttpSource::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_) | FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_sends_no_cache_headers() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"success": true, "sensors": [{"code": "temp_current", "value": 22.5}]}"#,
        )
        .await;

        let snapshot = HttpSource::new(&base).unwrap().fetch().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].key(), Some("temp_current"));

        let request = server.await.unwrap();
        assert!(request.starts_with("get /api/sensors/formatted "), "{}", request);
        assert!(request.contains("cache-control: no-cache, no-store"), "{}", request);
        assert!(request.contains("pragma: no-cache"), "{}", request);
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (base, server) = serve_once("503 Service Unavailable", "{}").await;

        let err = HttpSource::new(&base).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 503 }), "{:?}", err);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_is_payload_error() {
        let (base, server) = serve_once("200 OK", r#"{"success": false}"#).await;

        let err = HttpSource::new(&base).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)), "{:?}", err);
        server.await.unwrap();
    }
}
