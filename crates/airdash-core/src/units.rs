//! Temperature unit conversion.
//!
//! All conversions are fail-soft: an absent input yields an absent output.

pub(crate) fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub(crate) fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Convert Celsius to Fahrenheit.
///
/// ```
/// use airdash_core::units::celsius_to_fahrenheit;
///
/// assert_eq!(celsius_to_fahrenheit(Some(100.0)), Some(212.0));
/// assert_eq!(celsius_to_fahrenheit(None), None);
/// ```
pub fn celsius_to_fahrenheit(celsius: Option<f64>) -> Option<f64> {
    celsius.map(c_to_f)
}

/// Convert Fahrenheit to Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: Option<f64>) -> Option<f64> {
    fahrenheit.map(f_to_c)
}
