//! Data model for AirGradient location measurements.
//!
//! This crate provides the types shared by the derivation pipeline
//! (airdash-core), the proxy service and the terminal front-end.
//!
//! # Features
//!
//! - Upstream location readings with optional per-sensor fields
//! - Enriched locations carrying derived metrics and band colours
//! - Temperature unit preference
//! - Error types for parsing names and records
//!
//! # Example
//!
//! ```
//! use airdash_types::{LocationReading, LocationType};
//!
//! let json = r#"{"locationType":"indoor","pm02_corrected":5.0,"timestamp":"2024-01-05T15:04:05Z"}"#;
//! let reading: LocationReading = serde_json::from_str(json).unwrap();
//! assert_eq!(reading.location_type, LocationType::Indoor);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{BandColor, EnrichedLocation, LocationReading, LocationType, TemperatureUnit};
