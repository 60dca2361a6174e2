//! Locale-aware number and date rendering for measurement cards.
//!
//! Numbers follow en-US conventions (`,` groups thousands, `.` separates the
//! fraction). Nothing here fails: absent or non-finite numbers render as an
//! empty string and unknown date format keys fall back to a full datetime.

use std::fmt;
use std::str::FromStr;

use airdash_types::ParseError;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Digit limits for [`format_number`].
///
/// Written as `"<minInt>.<minFrac>-<maxFrac>"`, e.g. `"1.0-2"` (the default)
/// or `"1.1-1"` for exactly one fraction digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitsInfo {
    /// Minimum number of integer digits (zero-padded).
    pub min_integer: usize,
    /// Minimum number of fraction digits (zero-padded).
    pub min_fraction: usize,
    /// Maximum number of fraction digits (rounded).
    pub max_fraction: usize,
}

impl Default for DigitsInfo {
    fn default() -> Self {
        Self {
            min_integer: 1,
            min_fraction: 0,
            max_fraction: 2,
        }
    }
}

impl DigitsInfo {
    /// Create digit limits; `max_fraction` is raised to `min_fraction` if lower.
    pub const fn new(min_integer: usize, min_fraction: usize, max_fraction: usize) -> Self {
        let max_fraction = if max_fraction < min_fraction {
            min_fraction
        } else {
            max_fraction
        };
        Self {
            min_integer,
            min_fraction,
            max_fraction,
        }
    }
}

impl FromStr for DigitsInfo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidValue(format!("invalid digits pattern '{}'", s));

        let (int_part, fraction_part) = s.split_once('.').ok_or_else(invalid)?;
        let (min_fraction, max_fraction) = fraction_part.split_once('-').ok_or_else(invalid)?;

        let min_integer: usize = int_part.trim().parse().map_err(|_| invalid())?;
        let min_fraction: usize = min_fraction.trim().parse().map_err(|_| invalid())?;
        let max_fraction: usize = max_fraction.trim().parse().map_err(|_| invalid())?;

        if max_fraction < min_fraction {
            return Err(invalid());
        }

        Ok(Self::new(min_integer, min_fraction, max_fraction))
    }
}

impl fmt::Display for DigitsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}-{}",
            self.min_integer, self.min_fraction, self.max_fraction
        )
    }
}

/// Render a number with en-US grouping.
///
/// ```
/// use airdash_core::format::{format_number, DigitsInfo};
///
/// assert_eq!(format_number(Some(1234.5678), DigitsInfo::default()), "1,234.57");
/// assert_eq!(format_number(Some(21.0), "1.1-1".parse().unwrap()), "21.0");
/// assert_eq!(format_number(None, DigitsInfo::default()), "");
/// ```
pub fn format_number(value: Option<f64>, digits: DigitsInfo) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return String::new();
    };

    let (int_digits, mut fraction) = round_half_away(value.abs(), digits.max_fraction);
    while fraction.len() > digits.min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let int_digits = if int_digits.len() < digits.min_integer {
        format!("{:0>width$}", int_digits, width = digits.min_integer)
    } else {
        int_digits
    };

    let is_zero = int_digits.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    let mut out = String::with_capacity(int_digits.len() + fraction.len() + 4);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_digits));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Round a non-negative value to `max_fraction` digits, ties away from zero.
///
/// Works on the shortest decimal form of the value: `0.125` gives `0.13` and
/// `1.005` gives `1.01`. Returns the integer digits and exactly `max_fraction` fraction digits.
fn round_half_away(value: f64, max_fraction: usize) -> (String, String) {
    let shortest = value.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    if frac_part.len() <= max_fraction {
        return (
            int_part.to_string(),
            format!("{:0<width$}", frac_part, width = max_fraction),
        );
    }

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(max_fraction))
        .collect();
    if frac_part.as_bytes()[max_fraction] >= b'5' {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - max_fraction;
    let fraction = kept.split_off(split);
    (
        String::from_utf8_lossy(&kept).into_owned(),
        String::from_utf8_lossy(&fraction).into_owned(),
    )
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

const TIME_OF_DAY: &[FormatItem<'static>] =
    format_description!("[hour repr:12]:[minute]:[second] [period]");
const CALENDAR_DATE: &[FormatItem<'static>] = format_description!("[month]/[day]/[year]");
const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const FULL_DATETIME: &[FormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// Named date renderings selectable by format key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `hh:mm:ss a`, e.g. `03:04:05 PM`.
    TimeOfDay,
    /// `MM/dd/yyyy`, e.g. `01/05/2024`.
    CalendarDate,
    /// `yyyy-MM-dd` in UTC, e.g. `2024-01-05`.
    IsoDate,
    /// Anything else: `1/5/2024, 3:04:05 PM`.
    Full,
}

impl DateFormat {
    /// Select a rendering by key; unknown keys select [`DateFormat::Full`].
    pub fn from_key(key: &str) -> Self {
        match key {
            "hh:mm:ss a" => DateFormat::TimeOfDay,
            "MM/dd/yyyy" => DateFormat::CalendarDate,
            "yyyy-MM-dd" => DateFormat::IsoDate,
            _ => DateFormat::Full,
        }
    }

    fn items(&self) -> &'static [FormatItem<'static>] {
        match self {
            DateFormat::TimeOfDay => TIME_OF_DAY,
            DateFormat::CalendarDate => CALENDAR_DATE,
            DateFormat::IsoDate => ISO_DATE,
            DateFormat::Full => FULL_DATETIME,
        }
    }

    /// Render a timestamp.
    ///
    /// The ISO date is taken in UTC; the other renderings use the
    /// timestamp's own offset.
    pub fn render(&self, timestamp: OffsetDateTime) -> String {
        let timestamp = match self {
            DateFormat::IsoDate => timestamp.to_offset(UtcOffset::UTC),
            _ => timestamp,
        };
        timestamp.format(self.items()).unwrap_or_default()
    }
}

/// Render a timestamp using a format key (`"hh:mm:ss a"`, `"MM/dd/yyyy"`,
/// `"yyyy-MM-dd"`, anything else for a full datetime).
pub fn format_date(timestamp: OffsetDateTime, key: &str) -> String {
    DateFormat::from_key(key).render(timestamp)
}
