//! Measurement pipeline and refresh loop for AirGradient dashboards.
//!
//! This crate turns raw location readings from the AirGradient public API
//! into display-ready data, and keeps that data fresh.
//!
//! # Features
//!
//! - **Derived metrics**: US AQI from PM2.5, Rothfusz heat index
//! - **Severity bands**: per-metric colour and label tables
//! - **Batch processing**: enrichment split into indoor and outdoor locations
//! - **Polling**: fixed-period refresh with retry, supersession and auth stop
//! - **Formatting**: en-US numbers and named date formats
//! - **Mock collaborators**: scripted source and recorders for tests
//!
//! # Quick Start
//!
//! ```no_run
//! use airdash_core::ApiClient;
//! use airdash_core::processor::process_batch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(airdash_core::client::DEFAULT_BASE_URL)?;
//!     let readings = client.fetch_current("my-token").await?;
//!
//!     let batch = process_batch(readings);
//!     for location in &batch.indoor {
//!         println!("{}: AQI {:?}", location.reading.display_name(), location.pi02);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod derived;
pub mod error;
pub mod format;
pub mod mock;
pub mod notify;
pub mod poller;
pub mod processor;
pub mod settings;
pub mod thresholds;
pub mod traits;
pub mod units;

pub use airdash_types::types;

pub use client::ApiClient;
pub use derived::{HeatIndex, pm_to_us_aqi, rothfusz_heat_index};
pub use error::{Error, Result};
pub use format::{DateFormat, DigitsInfo, format_date, format_number};
pub use mock::{MockConsumer, MockNotifier, MockReply, MockSource};
pub use notify::{LoggingConsumer, TracingNotifier};
pub use poller::{PollController, PollOptions, PollOptionsBuilder, PollPhase};
pub use processor::{ProcessedBatch, enrich, process_batch};
pub use settings::MemorySettings;
pub use thresholds::{Metric, ThresholdBand, ThresholdTable, color_by_value};
pub use traits::{MeasuresSource, Notifier, SettingsStore, SnapshotConsumer};
pub use units::{celsius_to_fahrenheit, fahrenheit_to_celsius};

pub use airdash_types::{
    BandColor, EnrichedLocation, LocationReading, LocationType, TemperatureUnit,
};
