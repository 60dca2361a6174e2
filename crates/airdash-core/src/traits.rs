//! Collaborator traits for the poll controller.
//!
//! The controller never talks to HTTP, storage or a display directly. It
//! fetches through a [`MeasuresSource`], reports through a [`Notifier`] and
//! hands results to a [`SnapshotConsumer`]. Front-ends persist preferences
//! through a [`SettingsStore`].

use std::time::Duration;

use async_trait::async_trait;

use airdash_types::{EnrichedLocation, LocationReading};

use crate::error::Result;

/// Source of current location measurements.
///
/// Implemented by [`ApiClient`](crate::client::ApiClient) for the real API
/// and by [`MockSource`](crate::mock::MockSource) for tests.
///
/// # Example
///
/// ```ignore
/// use airdash_core::{MeasuresSource, Result};
///
/// async fn count<S: MeasuresSource>(source: &S, token: &str) -> Result<usize> {
///     Ok(source.fetch_current(token).await?.len())
/// }
/// ```
#[async_trait]
pub trait MeasuresSource: Send + Sync {
    /// Fetch the latest reading of every location visible to `token`.
    async fn fetch_current(&self, token: &str) -> Result<Vec<LocationReading>>;
}

/// User-visible message sink. Fire and forget.
pub trait Notifier: Send + Sync {
    /// Show `message` for roughly `duration`.
    fn notify(&self, message: &str, duration: Duration);
}

/// Receiver of enriched batches.
pub trait SnapshotConsumer: Send + Sync {
    /// Called once per successful fetch, after enrichment.
    fn on_snapshot_ready(&self, indoor: &[EnrichedLocation], outdoor: &[EnrichedLocation]);
}

/// Opaque key-value preference storage.
pub trait SettingsStore: Send + Sync {
    /// Read a value, `None` if unset or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
