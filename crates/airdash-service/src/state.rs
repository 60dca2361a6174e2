//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use airdash_core::client::MEASURES_PATH;

use crate::config::Config;

/// Shared application state.
///
/// The configuration is fixed for the lifetime of the server, so no locking
/// is needed.
pub struct AppState {
    /// Configuration the server was started with.
    pub config: Config,
    /// HTTP client for upstream requests (pooled connections).
    pub client: reqwest::Client,
    measures_url: String,
}

impl AppState {
    /// Create application state with a client honouring the upstream timeout.
    pub fn new(config: Config) -> Result<Arc<Self>, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.timeout_secs))
            .build()?;
        let measures_url = format!(
            "{}{}",
            config.upstream.base_url.trim_end_matches('/'),
            MEASURES_PATH
        );
        Ok(Arc::new(Self {
            config,
            client,
            measures_url,
        }))
    }

    /// Upstream URL for current measures, without query.
    pub fn measures_url(&self) -> &str {
        &self.measures_url
    }
}
