//! Derived metrics: US AQI from PM2.5 and the Rothfusz heat index.

use serde::{Deserialize, Serialize};

use crate::units::{c_to_f, f_to_c};

/// EPA PM2.5 breakpoints: `(c_lo, c_hi, i_lo, i_hi)`.
///
/// A concentration belongs to the first band whose `c_hi` it does not exceed.
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 9.0, 0.0, 50.0),
    (9.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 125.4, 151.0, 200.0),
    (125.5, 225.4, 201.0, 300.0),
    (225.5, 325.4, 301.0, 500.0),
];

const AQI_CEILING: f64 = 500.0;

/// Convert a PM2.5 concentration (µg/m³) to the US AQI.
///
/// The result is clamped to zero from below, capped at 500 above the last
/// breakpoint, and rounded to one decimal place. Absent (or NaN) input gives
/// an absent result.
///
/// ```
/// use airdash_core::derived::pm_to_us_aqi;
///
/// assert_eq!(pm_to_us_aqi(Some(9.0)), Some(50.0));
/// assert_eq!(pm_to_us_aqi(Some(400.0)), Some(500.0));
/// assert_eq!(pm_to_us_aqi(None), None);
/// ```
pub fn pm_to_us_aqi(pm02: Option<f64>) -> Option<f64> {
    let pm02 = pm02.filter(|v| !v.is_nan())?;

    let aqi = PM25_BREAKPOINTS
        .iter()
        .find(|(_, c_hi, _, _)| pm02 <= *c_hi)
        .map(|&(c_lo, c_hi, i_lo, i_hi)| (i_hi - i_lo) / (c_hi - c_lo) * (pm02 - c_lo) + i_lo)
        .unwrap_or(AQI_CEILING);

    Some(round_tenths(aqi.max(0.0)))
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Heat index in both units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatIndex {
    /// Heat index in °C.
    pub celsius: f64,
    /// Heat index in °F.
    pub fahrenheit: f64,
}

/// Compute the heat index with the NWS Rothfusz regression.
///
/// Below a simple-formula estimate of 80 °F the simple estimate is used
/// as-is. Otherwise the full regression applies, with the low-humidity and
/// high-humidity adjustments in their temperature windows.
///
/// A missing operand never fails. The Celsius half falls back to the
/// temperature (or zero) and the Fahrenheit half to zero, so `(None, None)`
/// yields `{ celsius: 0, fahrenheit: 0 }`.
pub fn rothfusz_heat_index(temp_c: Option<f64>, rh: Option<f64>) -> HeatIndex {
    let (Some(temp_c), Some(rh)) = (temp_c, rh) else {
        return HeatIndex {
            celsius: temp_c.unwrap_or(0.0),
            fahrenheit: 0.0,
        };
    };

    let t = c_to_f(temp_c);
    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);

    let hi = if simple < 80.0 {
        simple
    } else {
        let mut hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 0.00683783 * t * t
            - 0.05481717 * rh * rh
            + 0.00122874 * t * t * rh
            + 0.00085282 * t * rh * rh
            - 0.00000199 * t * t * rh * rh;

        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
        }
        if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
        }
        hi
    };

    HeatIndex {
        celsius: f_to_c(hi),
        fahrenheit: hi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regression(t: f64, rh: f64) -> f64 {
        -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 0.00683783 * t * t
            - 0.05481717 * rh * rh
            + 0.00122874 * t * t * rh
            + 0.00085282 * t * rh * rh
            - 0.00000199 * t * t * rh * rh
    }

    #[test]
    fn test_aqi_breakpoints() {
        assert_eq!(pm_to_us_aqi(Some(0.0)), Some(0.0));
        assert_eq!(pm_to_us_aqi(Some(9.0)), Some(50.0));
        assert_eq!(pm_to_us_aqi(Some(9.1)), Some(51.0));
        assert_eq!(pm_to_us_aqi(Some(35.4)), Some(100.0));
        assert_eq!(pm_to_us_aqi(Some(55.4)), Some(150.0));
        assert_eq!(pm_to_us_aqi(Some(125.4)), Some(200.0));
        assert_eq!(pm_to_us_aqi(Some(225.4)), Some(300.0));
        assert_eq!(pm_to_us_aqi(Some(325.4)), Some(500.0));
    }

    #[test]
    fn test_aqi_interpolates() {
        // 5 µg/m³ sits in the first band: 50/9 * 5 = 27.78
        assert_eq!(pm_to_us_aqi(Some(5.0)), Some(27.8));
        // 20 µg/m³: 49/26.3 * 10.9 + 51 = 71.31
        assert_eq!(pm_to_us_aqi(Some(20.0)), Some(71.3));
    }

    #[test]
    fn test_aqi_ceiling_and_floor() {
        assert_eq!(pm_to_us_aqi(Some(400.0)), Some(500.0));
        assert_eq!(pm_to_us_aqi(Some(f64::INFINITY)), Some(500.0));
        assert_eq!(pm_to_us_aqi(Some(-3.0)), Some(0.0));
    }

    #[test]
    fn test_aqi_absent() {
        assert_eq!(pm_to_us_aqi(None), None);
        assert_eq!(pm_to_us_aqi(Some(f64::NAN)), None);
    }

    #[test]
    fn test_heat_index_missing_operands() {
        assert_eq!(rothfusz_heat_index(None, None), HeatIndex::default());
        assert_eq!(rothfusz_heat_index(None, Some(50.0)), HeatIndex::default());

        let hi = rothfusz_heat_index(Some(20.0), None);
        assert_eq!(hi.celsius, 20.0);
        assert_eq!(hi.fahrenheit, 0.0);
    }

    #[test]
    fn test_heat_index_simple_formula() {
        // 20 °C = 68 °F; simple = 0.5 * (68 + 61 + 0 + 4.7) = 66.85
        let hi = rothfusz_heat_index(Some(20.0), Some(50.0));
        assert!((hi.fahrenheit - 66.85).abs() < 1e-9);
        assert!((hi.celsius - (66.85 - 32.0) * 5.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_heat_index_full_regression() {
        let hi = rothfusz_heat_index(Some(35.0), Some(80.0));
        let expected = regression(95.0, 80.0);
        assert!((hi.fahrenheit - expected).abs() < 1e-9);
        assert!((hi.celsius - (expected - 32.0) * 5.0 / 9.0).abs() < 1e-9);
        assert!(hi.celsius > 35.0);
    }

    #[test]
    fn test_heat_index_dry_adjustment() {
        // 40 °C = 104 °F at 10 % RH subtracts the low-humidity term.
        let t = 104.0;
        let rh = 10.0;
        let adjustment = ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0_f64).abs()) / 17.0).sqrt();
        let hi = rothfusz_heat_index(Some(40.0), Some(rh));
        assert!((hi.fahrenheit - (regression(t, rh) - adjustment)).abs() < 1e-9);
    }

    #[test]
    fn test_heat_index_humid_adjustment() {
        // 28 °C = 82.4 °F at 90 % RH adds the high-humidity term.
        let t = 28.0 * 9.0 / 5.0 + 32.0;
        let rh = 90.0;
        let adjustment = ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
        let hi = rothfusz_heat_index(Some(28.0), Some(rh));
        assert!((hi.fahrenheit - (regression(t, rh) + adjustment)).abs() < 1e-9);
    }
}

/// Property-based tests for the AQI conversion.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The AQI never decreases as the concentration grows.
        #[test]
        fn aqi_is_non_decreasing(a in 0.0f64..600.0, b in 0.0f64..600.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(pm_to_us_aqi(Some(lo)) <= pm_to_us_aqi(Some(hi)));
        }

        /// The AQI is within [0, 500] with at most one decimal place.
        #[test]
        fn aqi_is_bounded_and_rounded(pm in -50.0f64..1000.0) {
            let aqi = pm_to_us_aqi(Some(pm)).unwrap();
            prop_assert!((0.0..=500.0).contains(&aqi));
            prop_assert!(((aqi * 10.0).round() - aqi * 10.0).abs() < 1e-6);
        }

        /// Missing operands never panic and never produce NaN.
        #[test]
        fn heat_index_never_nan_for_finite_input(
            temp in proptest::option::of(-40.0f64..60.0),
            rh in proptest::option::of(0.0f64..100.0)
        ) {
            let hi = rothfusz_heat_index(temp, rh);
            prop_assert!(!hi.celsius.is_nan());
            prop_assert!(!hi.fahrenheit.is_nan());
        }
    }
}
