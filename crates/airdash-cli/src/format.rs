//! Output formatting for location cards and JSON.

use anyhow::Result;
use owo_colors::OwoColorize;
use time::{Date, UtcOffset};

use airdash_core::format::{DateFormat, DigitsInfo, format_number};
use airdash_core::processor::{has_temperature_data, is_present, measures_available};
use airdash_core::{BandColor, EnrichedLocation, Metric, ProcessedBatch, TemperatureUnit};

/// One decimal, always shown.
const TEMPERATURE_DIGITS: DigitsInfo = DigitsInfo::new(1, 1, 1);
/// Whole percent.
const HUMIDITY_DIGITS: DigitsInfo = DigitsInfo::new(1, 0, 0);

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Unit for temperature and heat index.
    pub unit: TemperatureUnit,
    /// Disable colored output.
    pub no_color: bool,
    /// Offset timestamps are shown in.
    pub offset: UtcOffset,
    /// The local date; readings from other days show their date, not time.
    pub today: Date,
}

impl FormatOptions {
    pub fn new(unit: TemperatureUnit, no_color: bool, offset: UtcOffset, today: Date) -> Self {
        Self {
            unit,
            no_color,
            offset,
            today,
        }
    }
}

/// Paint text in the colour of a severity band.
pub fn paint(text: &str, color: Option<BandColor>, no_color: bool) -> String {
    let Some(color) = color.filter(|_| !no_color) else {
        return text.to_string();
    };
    match color {
        BandColor::Green => format!("{}", text.green()),
        BandColor::Yellow => format!("{}", text.yellow()),
        BandColor::Orange => format!("{}", text.truecolor(255, 140, 0)),
        BandColor::Red => format!("{}", text.red()),
        BandColor::Purple => format!("{}", text.magenta()),
        BandColor::Brown => format!("{}", text.truecolor(150, 75, 0)),
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    if no_color {
        format!("{}\n{}", title, "━".repeat(title.chars().count()))
    } else {
        format!(
            "{}\n{}",
            title.bold(),
            "━".repeat(title.chars().count()).dimmed()
        )
    }
}

fn band_label(metric: Metric, value: Option<f64>) -> Option<&'static str> {
    value
        .and_then(|v| metric.table().classify(v))
        .map(|band| band.label)
}

fn value_line(
    out: &mut String,
    label: &str,
    value: String,
    color: Option<BandColor>,
    badge: Option<&str>,
    opts: &FormatOptions,
) {
    let value = paint(&value, color, opts.no_color);
    match badge {
        Some(badge) => out.push_str(&format!("  {:<16}{}  [{}]\n", label, value, badge)),
        None => out.push_str(&format!("  {:<16}{}\n", label, value)),
    }
}

/// Render one location as a text card.
///
/// Absent measures are left out; a location with nothing to show gets a
/// "No Measures Data" line instead.
#[must_use]
pub fn format_card(location: &EnrichedLocation, opts: &FormatOptions) -> String {
    let r = &location.reading;
    let name = r.display_name();
    let mut out = if opts.no_color {
        format!("── {} ──\n", name)
    } else {
        format!("── {} ──\n", name.cyan())
    };

    if !measures_available(location) {
        out.push_str("  No Measures Data\n");
    } else {
        let symbol = opts.unit.symbol();

        if is_present(r.pm02_corrected) {
            value_line(
                &mut out,
                "PM2.5:",
                format!("{} µg/m³", format_number(r.pm02_corrected, DigitsInfo::default())),
                location.pm02_clr,
                band_label(Metric::Pm02, r.pm02_corrected),
                opts,
            );
        }
        if is_present(location.pi02) {
            value_line(
                &mut out,
                "PM2.5 US AQI:",
                format_number(location.pi02, DigitsInfo::default()),
                location.pi02_clr,
                band_label(Metric::Pi02, location.pi02),
                opts,
            );
        }
        if is_present(r.rco2_corrected) {
            value_line(
                &mut out,
                "CO2:",
                format!("{}ppm", format_number(r.rco2_corrected, DigitsInfo::default())),
                location.rco2_clr,
                None,
                opts,
            );
        }
        if is_present(r.atmp_corrected) {
            let temperature = opts.unit.from_celsius(r.atmp_corrected);
            value_line(
                &mut out,
                "Temperature:",
                format!("{}{}", format_number(temperature, TEMPERATURE_DIGITS), symbol),
                None,
                None,
                opts,
            );
        }
        if is_present(r.rhum_corrected) {
            value_line(
                &mut out,
                "Humidity:",
                format!("{}%", format_number(r.rhum_corrected, HUMIDITY_DIGITS)),
                None,
                None,
                opts,
            );
        }
        if is_present(r.heatindex) {
            let heat_index = opts.unit.from_celsius(r.heatindex);
            value_line(
                &mut out,
                "Heat Index:",
                format!("{}{}", format_number(heat_index, TEMPERATURE_DIGITS), symbol),
                location.heatindex_clr,
                None,
                opts,
            );
        }
        if is_present(r.tvoc_index) {
            value_line(
                &mut out,
                "VOC Index:",
                format_number(r.tvoc_index, DigitsInfo::default()),
                location.tvoc_index_clr,
                None,
                opts,
            );
        }
        if is_present(r.nox_index) {
            value_line(
                &mut out,
                "NOx Index:",
                format_number(r.nox_index, DigitsInfo::default()),
                location.nox_index_clr,
                None,
                opts,
            );
        }
    }

    out.push_str(&format_last_update(location, opts));
    out
}

/// "Last Update" line: the time for today's readings, the date otherwise.
pub fn format_last_update(location: &EnrichedLocation, opts: &FormatOptions) -> String {
    let timestamp = location.reading.timestamp.to_offset(opts.offset);
    let line = if timestamp.date() != opts.today {
        format!(
            "Last Updated: {}",
            DateFormat::CalendarDate.render(timestamp)
        )
    } else {
        format!("Last Update: {}", DateFormat::TimeOfDay.render(timestamp))
    };

    if opts.no_color {
        format!("  {}\n", line)
    } else {
        format!("  {}\n", line.dimmed())
    }
}

fn format_section(title: &str, locations: &[EnrichedLocation], opts: &FormatOptions) -> String {
    let mut out = format_title(title, opts.no_color);
    out.push('\n');
    for location in locations {
        out.push('\n');
        out.push_str(&format_card(location, opts));
    }
    out
}

/// Render the whole dashboard. Sections without locations are left out.
#[must_use]
pub fn format_dashboard(batch: &ProcessedBatch, opts: &FormatOptions) -> String {
    let mut sections = Vec::new();
    if !batch.indoor.is_empty() {
        sections.push(format_section("Indoor", &batch.indoor, opts));
    }
    if !batch.outdoor.is_empty() {
        sections.push(format_section("Outdoor", &batch.outdoor, opts));
    }

    if sections.is_empty() {
        return "No indoor or outdoor locations reported.\n".to_string();
    }

    let mut text = sections.join("\n");
    if has_temperature_data(&batch.indoor) || has_temperature_data(&batch.outdoor) {
        text.push_str(&format!(
            "\nTemperatures in {}. Switch with `airdash config toggle-unit`.\n",
            opts.unit.symbol()
        ));
    }
    text
}

/// Render the enriched batch as pretty JSON.
pub fn format_batch_json(batch: &ProcessedBatch) -> Result<String> {
    Ok(serde_json::to_string_pretty(batch)? + "\n")
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}
