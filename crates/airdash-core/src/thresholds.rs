//! Severity bands for displayed metrics.
//!
//! Each metric has a fixed table of bands ordered by ascending `max`. A value
//! falls in the first band whose `max` it does not exceed; the last band also
//! catches anything beyond its `max`.
//!
//! # Example
//!
//! ```
//! use airdash_core::thresholds::{color_by_value, Metric};
//! use airdash_types::BandColor;
//!
//! assert_eq!(color_by_value(9.0, "pm02"), "green");
//! assert_eq!(color_by_value(9.1, "pm02"), "yellow");
//! assert_eq!(color_by_value(42.0, "no_such_metric"), "");
//!
//! let band = Metric::Rco2.table().classify(1200.0).unwrap();
//! assert_eq!(band.color, BandColor::Orange);
//! assert_eq!(band.label, "Moderate");
//! ```

use core::fmt;
use std::str::FromStr;

use airdash_types::BandColor::{Brown, Green, Orange, Purple, Red, Yellow};
use airdash_types::{BandColor, ParseError};

/// One segment of a metric's classification range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    /// Position in the table, starting at 1.
    pub order: u8,
    /// Band colour.
    pub color: BandColor,
    /// Inclusive upper bound.
    pub max: f64,
    /// Short description for display.
    pub label: &'static str,
}

const fn band(order: u8, color: BandColor, max: f64, label: &'static str) -> ThresholdBand {
    ThresholdBand {
        order,
        color,
        max,
        label,
    }
}

static PM02: [ThresholdBand; 6] = [
    band(1, Green, 9.0, "Good"),
    band(2, Yellow, 35.4, "Moderate"),
    band(3, Orange, 55.4, "Unhealthy"),
    band(4, Red, 125.4, "Unhealthy"),
    band(5, Purple, 225.4, "Very Unhealthy"),
    band(6, Brown, 10000.0, "Hazardous"),
];

static PI02: [ThresholdBand; 6] = [
    band(1, Green, 50.0, "Good"),
    band(2, Yellow, 100.0, "Moderate"),
    band(3, Orange, 150.0, "Unhealthy"),
    band(4, Red, 200.0, "Unhealthy"),
    band(5, Purple, 300.0, "Very Unhealthy"),
    band(6, Brown, 500.0, "Hazardous"),
];

static RCO2: [ThresholdBand; 6] = [
    band(1, Green, 800.0, "Excellent"),
    band(2, Yellow, 1000.0, "Good"),
    band(3, Orange, 1500.0, "Moderate"),
    band(4, Red, 2000.0, "Poor"),
    band(5, Purple, 3000.0, "Dangerous"),
    band(6, Brown, 10000.0, "Hazardous"),
];

static TVOC: [ThresholdBand; 6] = [
    band(1, Green, 44.0, "Very Low"),
    band(2, Yellow, 111.0, "Low"),
    band(3, Orange, 222.0, "Moderate"),
    band(4, Red, 2222.0, "Elevated"),
    band(5, Purple, 22222.0, "High"),
    band(6, Brown, 100000.0, "Very High"),
];

static TVOC_INDEX: [ThresholdBand; 4] = [
    band(1, Green, 150.0, "Low"),
    band(2, Yellow, 250.0, "Moderate"),
    band(3, Orange, 400.0, "Elevated"),
    band(4, Red, 500000.0, "High"),
];

static NOX_INDEX: [ThresholdBand; 4] = [
    band(1, Green, 20.0, "Low"),
    band(2, Yellow, 150.0, "Moderate"),
    band(3, Orange, 300.0, "Elevated"),
    band(4, Red, 500000.0, "High"),
];

static HEAT_INDEX: [ThresholdBand; 4] = [
    band(1, Green, 32.0, "Good"),
    band(2, Yellow, 40.0, "Moderate"),
    band(3, Orange, 53.0, "High"),
    band(4, Red, 1000.0, "Dangerous"),
];

// Low voltage is the critical end, so red comes first here.
static VOLT: [ThresholdBand; 4] = [
    band(1, Red, 9.0, "Critical"),
    band(2, Orange, 10.0, "Very Low"),
    band(3, Yellow, 11.0, "Low"),
    band(4, Green, 12.6, "Normal"),
];

/// An ordered set of bands for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    bands: &'static [ThresholdBand],
}

impl ThresholdTable {
    /// Bands in ascending `max` order.
    pub fn bands(&self) -> &'static [ThresholdBand] {
        self.bands
    }

    /// Find the band for a value.
    ///
    /// Returns `None` only for NaN.
    pub fn classify(&self, value: f64) -> Option<&'static ThresholdBand> {
        if value.is_nan() {
            return None;
        }
        self.bands
            .iter()
            .find(|band| value <= band.max)
            .or_else(|| self.bands.last())
    }
}

/// A metric with a severity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// PM2.5 in µg/m³.
    Pm02,
    /// PM2.5 as US AQI.
    Pi02,
    /// CO2 in ppm.
    Rco2,
    /// TVOC in ppb.
    Tvoc,
    /// VOC index.
    TvocIndex,
    /// NOx index.
    NoxIndex,
    /// Heat index in °C.
    HeatIndex,
    /// Supply voltage.
    Volt,
}

impl Metric {
    /// Every metric with a table.
    pub const ALL: [Metric; 8] = [
        Metric::Pm02,
        Metric::Pi02,
        Metric::Rco2,
        Metric::Tvoc,
        Metric::TvocIndex,
        Metric::NoxIndex,
        Metric::HeatIndex,
        Metric::Volt,
    ];

    /// Name used by the upstream API and in colour lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Pm02 => "pm02",
            Metric::Pi02 => "pi02",
            Metric::Rco2 => "rco2",
            Metric::Tvoc => "tvoc",
            Metric::TvocIndex => "tvoc_index",
            Metric::NoxIndex => "nox_index",
            Metric::HeatIndex => "heatindex",
            Metric::Volt => "volt",
        }
    }

    /// The metric's band table.
    pub fn table(&self) -> ThresholdTable {
        let bands: &'static [ThresholdBand] = match self {
            Metric::Pm02 => &PM02,
            Metric::Pi02 => &PI02,
            Metric::Rco2 => &RCO2,
            Metric::Tvoc => &TVOC,
            Metric::TvocIndex => &TVOC_INDEX,
            Metric::NoxIndex => &NOX_INDEX,
            Metric::HeatIndex => &HEAT_INDEX,
            Metric::Volt => &VOLT,
        };
        ThresholdTable { bands }
    }

    /// Band colour for a value, `None` for NaN.
    pub fn color(&self, value: f64) -> Option<BandColor> {
        self.table().classify(value).map(|band| band.color)
    }

    /// Band colour for an optional value.
    pub fn color_of(&self, value: Option<f64>) -> Option<BandColor> {
        value.and_then(|v| self.color(v))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseError::InvalidValue(format!("unknown metric '{}'", s)))
    }
}

/// Colour name for a value of the named metric.
///
/// Unknown metric names and NaN give an empty string.
pub fn color_by_value(value: f64, metric: &str) -> &'static str {
    metric
        .parse::<Metric>()
        .ok()
        .and_then(|m| m.color(value))
        .map_or("", |color| color.as_str())
}
