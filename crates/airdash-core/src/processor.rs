//! Batch enrichment of location readings.
//!
//! [`process_batch`] partitions a fetched batch by placement and runs every
//! record through [`enrich`]. Nothing here touches shared state; the poll
//! controller installs the returned batch itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use airdash_types::{EnrichedLocation, LocationReading, LocationType};

use crate::derived::{pm_to_us_aqi, rothfusz_heat_index};
use crate::thresholds::Metric;
use crate::units::celsius_to_fahrenheit;

/// Enriched readings split by placement, each in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBatch {
    pub indoor: Vec<EnrichedLocation>,
    pub outdoor: Vec<EnrichedLocation>,
}

impl ProcessedBatch {
    /// Total number of locations.
    pub fn len(&self) -> usize {
        self.indoor.len() + self.outdoor.len()
    }

    /// Whether neither partition has a location.
    pub fn is_empty(&self) -> bool {
        self.indoor.is_empty() && self.outdoor.is_empty()
    }
}

/// Enrich a batch and split it into indoor and outdoor locations.
///
/// Records whose placement is neither indoor nor outdoor are dropped.
pub fn process_batch(readings: Vec<LocationReading>) -> ProcessedBatch {
    let total = readings.len();
    let mut batch = ProcessedBatch::default();

    for reading in readings {
        match reading.location_type {
            LocationType::Indoor => batch.indoor.push(enrich(reading)),
            LocationType::Outdoor => batch.outdoor.push(enrich(reading)),
            LocationType::Other => {}
        }
    }

    let dropped = total - batch.len();
    if dropped > 0 {
        debug!("Dropped {} location(s) with unknown placement", dropped);
    }
    debug!(
        indoor = batch.indoor.len(),
        outdoor = batch.outdoor.len(),
        "Processed location batch"
    );

    batch
}

/// Add derived metrics and band colours to one reading.
///
/// A heat index supplied by the upstream API is kept unchanged; otherwise it
/// is derived from the raw temperature and humidity.
pub fn enrich(mut reading: LocationReading) -> EnrichedLocation {
    let pi02 = pm_to_us_aqi(reading.pm02_corrected);
    let atmp_fahrenheit = celsius_to_fahrenheit(reading.atmp);

    let heat_index_fahrenheit = match reading.heatindex {
        Some(_) => None,
        None => {
            let hi = rothfusz_heat_index(reading.atmp, reading.rhum);
            reading.heatindex = Some(hi.celsius);
            Some(hi.fahrenheit)
        }
    };

    EnrichedLocation {
        pi02,
        atmp_fahrenheit,
        heat_index_fahrenheit,
        pm02_clr: Metric::Pm02.color_of(reading.pm02_corrected),
        pi02_clr: Metric::Pi02.color_of(pi02),
        rco2_clr: Metric::Rco2.color_of(reading.rco2_corrected),
        heatindex_clr: Metric::HeatIndex.color_of(reading.heatindex),
        tvoc_clr: Metric::Tvoc.color_of(reading.tvoc),
        tvoc_index_clr: Metric::TvocIndex.color_of(reading.tvoc_index),
        nox_index_clr: Metric::NoxIndex.color_of(reading.nox_index),
        reading,
    }
}

/// Whether a value is present and not NaN.
pub fn is_present(value: Option<f64>) -> bool {
    value.is_some_and(|v| !v.is_nan())
}

/// Whether a location has anything worth showing on a card.
pub fn measures_available(location: &EnrichedLocation) -> bool {
    let r = &location.reading;
    [
        r.pm02,
        location.pi02,
        r.rco2,
        r.atmp,
        location.atmp_fahrenheit,
        r.rhum,
        r.heatindex,
    ]
    .iter()
    .any(Option::is_some)
}

/// Whether any location reports a temperature or heat index.
///
/// Front-ends use this to decide whether a unit toggle is worth showing.
pub fn has_temperature_data(locations: &[EnrichedLocation]) -> bool {
    locations
        .iter()
        .any(|l| is_present(l.reading.atmp_corrected) || is_present(l.reading.heatindex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdash_types::BandColor;
    use time::macros::datetime;

    fn reading(location_type: LocationType) -> LocationReading {
        LocationReading::new(location_type, datetime!(2024-01-05 15:04:05 UTC))
    }

    fn named(location_type: LocationType, name: &str) -> LocationReading {
        let mut r = reading(location_type);
        r.location_name = Some(name.to_string());
        r
    }

    #[test]
    fn test_enrich_derives_metrics() {
        let mut r = reading(LocationType::Indoor);
        r.pm02_corrected = Some(5.0);
        r.atmp = Some(20.0);
        r.rhum = Some(50.0);

        let e = enrich(r);
        assert_eq!(e.pi02, pm_to_us_aqi(Some(5.0)));
        assert_eq!(e.pi02_clr, Some(BandColor::Green));
        assert_eq!(e.pm02_clr, Some(BandColor::Green));

        let hi = rothfusz_heat_index(Some(20.0), Some(50.0));
        assert_eq!(e.reading.heatindex, Some(hi.celsius));
        assert_eq!(e.heat_index_fahrenheit, Some(hi.fahrenheit));
        assert!(e.heatindex_clr.is_some());
        assert_eq!(e.atmp_fahrenheit, Some(68.0));
    }

    #[test]
    fn test_enrich_keeps_supplied_heat_index() {
        let mut r = reading(LocationType::Outdoor);
        r.heatindex = Some(41.234567);
        r.atmp = Some(20.0);
        r.rhum = Some(50.0);

        let e = enrich(r);
        assert_eq!(e.reading.heatindex, Some(41.234567));
        assert!(e.heat_index_fahrenheit.is_none());
        assert_eq!(e.heatindex_clr, Some(BandColor::Orange));
    }

    #[test]
    fn test_enrich_with_missing_inputs() {
        let e = enrich(reading(LocationType::Indoor));
        assert!(e.pi02.is_none());
        assert!(e.pi02_clr.is_none());
        assert!(e.pm02_clr.is_none());
        assert!(e.rco2_clr.is_none());
        assert_eq!(e.reading.heatindex, Some(0.0));
        assert_eq!(e.heat_index_fahrenheit, Some(0.0));
        assert_eq!(e.heatindex_clr, Some(BandColor::Green));
    }

    #[test]
    fn test_partition_preserves_order_and_drops_others() {
        let batch = process_batch(vec![
            named(LocationType::Indoor, "a"),
            named(LocationType::Outdoor, "b"),
            named(LocationType::Other, "c"),
            named(LocationType::Indoor, "d"),
            named(LocationType::Outdoor, "e"),
        ]);

        let names = |v: &[EnrichedLocation]| {
            v.iter()
                .map(|l| l.reading.display_name())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&batch.indoor), ["a", "d"]);
        assert_eq!(names(&batch.outdoor), ["b", "e"]);
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_empty_batch() {
        let batch = process_batch(Vec::new());
        assert!(batch.is_empty());

        let batch = process_batch(vec![reading(LocationType::Other)]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_classifies_other_metrics() {
        let mut r = reading(LocationType::Indoor);
        r.rco2_corrected = Some(1200.0);
        r.tvoc = Some(120.0);
        r.tvoc_index = Some(300.0);
        r.nox_index = Some(5.0);

        let e = enrich(r);
        assert_eq!(e.rco2_clr, Some(BandColor::Orange));
        assert_eq!(e.tvoc_clr, Some(BandColor::Orange));
        assert_eq!(e.tvoc_index_clr, Some(BandColor::Orange));
        assert_eq!(e.nox_index_clr, Some(BandColor::Green));
    }

    #[test]
    fn test_measures_available() {
        let mut e = enrich(reading(LocationType::Indoor));
        e.reading.heatindex = None;
        e.heat_index_fahrenheit = None;
        assert!(!measures_available(&e));

        e.reading.rco2 = Some(600.0);
        assert!(measures_available(&e));
    }

    #[test]
    fn test_has_temperature_data() {
        let mut with_temp = reading(LocationType::Indoor);
        with_temp.atmp_corrected = Some(21.0);
        with_temp.heatindex = Some(f64::NAN);

        let mut without = reading(LocationType::Indoor);
        without.heatindex = Some(f64::NAN);

        let without = enrich(without);
        assert!(!has_temperature_data(std::slice::from_ref(&without)));
        assert!(has_temperature_data(&[without, enrich(with_temp)]));
        assert!(!has_temperature_data(&[]));
    }

    #[test]
    fn test_is_present() {
        assert!(is_present(Some(0.0)));
        assert!(!is_present(None));
        assert!(!is_present(Some(f64::NAN)));
    }
}
