//! HTTP client for the AirGradient public API.
//!
//! # Example
//!
//! ```no_run
//! use airdash_core::client::ApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("https://api.airgradient.com")?;
//!
//! let readings = client.fetch_current("my-token").await?;
//! println!("{} location(s)", readings.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use airdash_types::{LocationReading, ParseError};

use crate::error::{Error, Result};
use crate::traits::MeasuresSource;

/// Public AirGradient API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.airgradient.com";

/// Path of the current-measures endpoint, relative to the base URL.
pub const MEASURES_PATH: &str = "/public/api/v1/locations/measures/current";

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the current-measures endpoint.
///
/// The base URL may point at the API itself or at a proxy that mirrors its
/// paths (such as `http://127.0.0.1:3001/api`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Request)?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the current-measures endpoint, without the token.
    pub fn measures_url(&self) -> String {
        format!("{}{}", self.base_url, MEASURES_PATH)
    }

    /// Fetch the current reading of every location visible to `token`.
    ///
    /// 401 and 403 map to [`Error::Auth`]. Elements of the response array
    /// that do not decode as a [`LocationReading`] are skipped.
    pub async fn fetch_current(&self, token: &str) -> Result<Vec<LocationReading>> {
        let url = self.measures_url();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body.chars().take(200).collect()
            };
            return Err(Error::from_status(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        decode_batch(&body)
    }
}

#[async_trait]
impl MeasuresSource for ApiClient {
    async fn fetch_current(&self, token: &str) -> Result<Vec<LocationReading>> {
        ApiClient::fetch_current(self, token).await
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}

/// Decode a current-measures response body.
///
/// The body must be a JSON array. Malformed elements are logged and dropped
/// so one bad record does not hide the rest of the batch.
pub fn decode_batch(body: &[u8]) -> Result<Vec<LocationReading>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;

    let serde_json::Value::Array(items) = value else {
        return Err(Error::Decode("expected a JSON array of locations".to_string()));
    };

    let mut readings = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<LocationReading>(item) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                let err = ParseError::InvalidRecord {
                    index,
                    message: e.to_string(),
                };
                warn!("Skipping location: {}", err);
            }
        }
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdash_types::LocationType;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(client.base_url(), "https://api.airgradient.com");
        assert_eq!(
            client.measures_url(),
            "https://api.airgradient.com/public/api/v1/locations/measures/current"
        );
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = ApiClient::new("http://localhost:3001/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/api");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = ApiClient::new("localhost:3001");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_decode_batch() {
        let body = br#"[
            {"locationName":"Office","locationType":"indoor","pm02_corrected":4.2,"timestamp":"2024-01-05T15:04:05Z"},
            {"locationName":"Yard","locationType":"outdoor","atmp":30,"rhum":60,"timestamp":"2024-01-05T15:04:05Z"}
        ]"#;
        let readings = decode_batch(body).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].location_type, LocationType::Indoor);
        assert_eq!(readings[1].atmp, Some(30.0));
    }

    #[test]
    fn test_decode_batch_skips_malformed_elements() {
        let body = br#"[
            {"locationType":"indoor","timestamp":"2024-01-05T15:04:05Z"},
            {"locationType":"indoor","pm02_corrected":"lots","timestamp":"2024-01-05T15:04:05Z"},
            42,
            {"locationType":"outdoor"},
            {"locationType":"outdoor","timestamp":"2024-01-05T15:04:05Z"}
        ]"#;
        let readings = decode_batch(body).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].location_type, LocationType::Outdoor);
    }

    #[test]
    fn test_decode_batch_rejects_non_array() {
        assert!(matches!(
            decode_batch(br#"{"message":"Unauthorized"}"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(decode_batch(b"<html>"), Err(Error::Decode(_))));
        assert!(decode_batch(b"[]").unwrap().is_empty());
    }
}
