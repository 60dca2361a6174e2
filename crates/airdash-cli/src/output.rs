//! Terminal implementations of the poll controller's collaborators.

use std::io::Write;
use std::time::Duration;

use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

use airdash_core::format::DateFormat;
use airdash_core::{EnrichedLocation, Notifier, ProcessedBatch, SnapshotConsumer, TemperatureUnit};

use crate::format::{FormatOptions, format_batch_json, format_dashboard, format_warning};

/// Notifier that prints to stderr.
///
/// A terminal has no toast to dismiss, so the display duration is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier {
    no_color: bool,
}

impl StderrNotifier {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str, _duration: Duration) {
        eprintln!("{}", format_warning(message, self.no_color));
    }
}

/// Consumer that prints every snapshot to stdout.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConsumer {
    unit: TemperatureUnit,
    no_color: bool,
    json: bool,
    offset: UtcOffset,
}

impl TerminalConsumer {
    pub fn new(unit: TemperatureUnit, no_color: bool, json: bool, offset: UtcOffset) -> Self {
        Self {
            unit,
            no_color,
            json,
            offset,
        }
    }

    /// Render a snapshot as it would be printed at `now`.
    pub fn render(
        &self,
        indoor: &[EnrichedLocation],
        outdoor: &[EnrichedLocation],
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let batch = ProcessedBatch {
            indoor: indoor.to_vec(),
            outdoor: outdoor.to_vec(),
        };
        if self.json {
            // One document per line.
            return Ok(serde_json::to_string(&batch)? + "\n");
        }

        let now = now.to_offset(self.offset);
        let opts = FormatOptions::new(self.unit, self.no_color, self.offset, now.date());
        Ok(format!(
            "\nRefreshed at {}\n\n{}",
            DateFormat::TimeOfDay.render(now),
            format_dashboard(&batch, &opts)
        ))
    }
}

impl SnapshotConsumer for TerminalConsumer {
    fn on_snapshot_ready(&self, indoor: &[EnrichedLocation], outdoor: &[EnrichedLocation]) {
        match self.render(indoor, outdoor, OffsetDateTime::now_utc()) {
            Ok(text) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
                    warn!("Failed to write snapshot: {}", e);
                }
            }
            Err(e) => warn!("Failed to render snapshot: {}", e),
        }
    }
}

/// Print a one-off batch the same way `watch` prints snapshots, minus the
/// refresh header.
pub fn render_batch(batch: &ProcessedBatch, opts: &FormatOptions, json: bool) -> anyhow::Result<String> {
    if json {
        format_batch_json(batch)
    } else {
        Ok(format_dashboard(batch, opts))
    }
}
