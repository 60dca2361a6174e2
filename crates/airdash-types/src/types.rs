//! Core types for AirGradient location measurements.

use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Placement of a monitor.
///
/// Upstream values other than `indoor` and `outdoor` (including a missing
/// field) decode to [`LocationType::Other`]; such records are never displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// Monitor placed inside a building.
    Indoor,
    /// Monitor placed outside.
    Outdoor,
    /// Anything else the upstream API reports.
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Indoor => write!(f, "indoor"),
            LocationType::Outdoor => write!(f, "outdoor"),
            LocationType::Other => write!(f, "other"),
        }
    }
}

/// One element of the `measures/current` response.
///
/// Every measurement is optional because monitors omit what they cannot
/// sense. Fields this type does not name are kept in [`extra`](Self::extra)
/// so a record can be re-serialized without losing upstream data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReading {
    /// Upstream location identifier.
    #[serde(rename = "locationId", default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
    /// Human-readable location name.
    #[serde(rename = "locationName", default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Indoor or outdoor placement.
    #[serde(rename = "locationType", default)]
    pub location_type: LocationType,
    /// Raw PM2.5 in µg/m³.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm02: Option<f64>,
    /// Corrected PM2.5 in µg/m³.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm02_corrected: Option<f64>,
    /// Raw CO2 in ppm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rco2: Option<f64>,
    /// Corrected CO2 in ppm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rco2_corrected: Option<f64>,
    /// Raw temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmp: Option<f64>,
    /// Corrected temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmp_corrected: Option<f64>,
    /// Raw relative humidity in %.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhum: Option<f64>,
    /// Corrected relative humidity in %.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhum_corrected: Option<f64>,
    /// Total volatile organic compounds in ppb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvoc: Option<f64>,
    /// Sensirion VOC index.
    #[serde(rename = "tvocIndex", default, skip_serializing_if = "Option::is_none")]
    pub tvoc_index: Option<f64>,
    /// Sensirion NOx index.
    #[serde(rename = "noxIndex", default, skip_serializing_if = "Option::is_none")]
    pub nox_index: Option<f64>,
    /// Heat index in °C, when the upstream API already supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatindex: Option<f64>,
    /// When the measurement was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Upstream fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LocationReading {
    /// Create a reading with only placement and timestamp set.
    pub fn new(location_type: LocationType, timestamp: OffsetDateTime) -> Self {
        Self {
            location_id: None,
            location_name: None,
            location_type,
            pm02: None,
            pm02_corrected: None,
            rco2: None,
            rco2_corrected: None,
            atmp: None,
            atmp_corrected: None,
            rhum: None,
            rhum_corrected: None,
            tvoc: None,
            tvoc_index: None,
            nox_index: None,
            heatindex: None,
            timestamp,
            extra: BTreeMap::new(),
        }
    }

    /// Display name, falling back to the location id.
    pub fn display_name(&self) -> String {
        match (&self.location_name, self.location_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Location {}", id),
            (None, None) => "Unnamed location".to_string(),
        }
    }
}

/// Severity band colour.
///
/// Serialized and displayed as the lower-case colour name, which is the
/// classification value a renderer keys its styling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandColor {
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
    Brown,
}

impl BandColor {
    /// Lower-case colour name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BandColor::Green => "green",
            BandColor::Yellow => "yellow",
            BandColor::Orange => "orange",
            BandColor::Red => "red",
            BandColor::Purple => "purple",
            BandColor::Brown => "brown",
        }
    }
}

impl fmt::Display for BandColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BandColor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(BandColor::Green),
            "yellow" => Ok(BandColor::Yellow),
            "orange" => Ok(BandColor::Orange),
            "red" => Ok(BandColor::Red),
            "purple" => Ok(BandColor::Purple),
            "brown" => Ok(BandColor::Brown),
            _ => Err(ParseError::InvalidValue(format!("unknown colour '{}'", s))),
        }
    }
}

/// A [`LocationReading`] with derived metrics and per-metric band colours.
///
/// Serializes flat: the reading's fields followed by the derived ones, which
/// is the shape the dashboard front-ends consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLocation {
    /// The reading; `heatindex` is filled in when it had to be derived.
    #[serde(flatten)]
    pub reading: LocationReading,
    /// US AQI computed from `pm02_corrected`.
    #[serde(default)]
    pub pi02: Option<f64>,
    /// Raw temperature converted to °F.
    #[serde(default)]
    pub atmp_fahrenheit: Option<f64>,
    /// Derived heat index in °F (absent when upstream supplied `heatindex`).
    #[serde(default)]
    pub heat_index_fahrenheit: Option<f64>,
    #[serde(default)]
    pub pm02_clr: Option<BandColor>,
    #[serde(default)]
    pub pi02_clr: Option<BandColor>,
    #[serde(default)]
    pub rco2_clr: Option<BandColor>,
    #[serde(default)]
    pub heatindex_clr: Option<BandColor>,
    #[serde(default)]
    pub tvoc_clr: Option<BandColor>,
    #[serde(default)]
    pub tvoc_index_clr: Option<BandColor>,
    #[serde(default)]
    pub nox_index_clr: Option<BandColor>,
}

/// Temperature display unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// The other unit.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    /// Unit symbol including the degree sign.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Express a Celsius reading in this unit; absent stays absent.
    ///
    /// ```
    /// use airdash_types::TemperatureUnit;
    ///
    /// assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(Some(20.0)), Some(68.0));
    /// assert_eq!(TemperatureUnit::Celsius.from_celsius(Some(20.0)), Some(20.0));
    /// assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(None), None);
    /// ```
    #[must_use]
    pub fn from_celsius(self, celsius: Option<f64>) -> Option<f64> {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius.map(|c| c * 9.0 / 5.0 + 32.0),
        }
    }

    /// Name used when persisting the preference.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ParseError;

    /// Parse a unit name.
    ///
    /// # Examples
    ///
    /// ```
    /// use airdash_types::TemperatureUnit;
    ///
    /// assert_eq!("fahrenheit".parse(), Ok(TemperatureUnit::Fahrenheit));
    /// assert_eq!("C".parse(), Ok(TemperatureUnit::Celsius));
    /// assert!("kelvin".parse::<TemperatureUnit>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(ParseError::InvalidValue(format!(
                "unknown temperature unit '{}'",
                s
            ))),
        }
    }
}
