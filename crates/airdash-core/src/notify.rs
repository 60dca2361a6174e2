//! Default [`Notifier`] and [`SnapshotConsumer`] implementations.

use std::time::Duration;

use tracing::{info, warn};

use airdash_types::EnrichedLocation;

use crate::traits::{Notifier, SnapshotConsumer};

/// Message shown when the API rejects the token.
pub const AUTH_FAILED_MESSAGE: &str = "Invalid or expired token. Please refresh your token.";

/// How long error notices stay up.
pub const NOTICE_DURATION: Duration = Duration::from_millis(5000);

/// Notifier that writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        warn!(duration_ms = duration.as_millis() as u64, "{}", message);
    }
}

/// Consumer that only logs batch sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConsumer;

impl SnapshotConsumer for LoggingConsumer {
    fn on_snapshot_ready(&self, indoor: &[EnrichedLocation], outdoor: &[EnrichedLocation]) {
        info!(
            indoor = indoor.len(),
            outdoor = outdoor.len(),
            "Snapshot ready"
        );
    }
}
