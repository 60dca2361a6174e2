//! Watch command implementation.
//!
//! Hands the API client to a [`PollController`] and prints every snapshot it
//! delivers until Ctrl-C, or until the token is rejected.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use time::UtcOffset;
use tracing::{debug, info};

use airdash_core::settings::load_temperature_unit;
use airdash_core::{ApiClient, PollController, PollOptions, PollPhase, SettingsStore};

use crate::cli::{ApiArgs, OutputArgs};
use crate::output::{StderrNotifier, TerminalConsumer};

use super::resolve_token;

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub api: &'a ApiArgs,
    pub interval: u64,
    pub output: &'a OutputArgs,
    pub settings: &'a dyn SettingsStore,
    pub offset: UtcOffset,
}

pub async fn cmd_watch(args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        api,
        interval,
        output,
        settings,
        offset,
    } = args;

    let token = resolve_token(api.token.as_deref(), settings)?;
    let unit = output.resolve_unit(load_temperature_unit(settings));
    let options = PollOptions::builder()
        .refresh_interval(Duration::from_secs(interval))
        .build();

    let controller = PollController::new(
        Arc::new(ApiClient::new(&api.base_url)?),
        Arc::new(StderrNotifier::new(output.no_color)),
        Arc::new(TerminalConsumer::new(unit, output.no_color, output.json, offset)),
        options,
    )?;

    let mut phases = controller.subscribe_phase();
    controller.start(&token)?;
    info!("Watching {} every {}s (Ctrl-C to stop)", api.base_url, interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                controller.stop();
                eprintln!("\nShutting down...");
                return Ok(());
            }
            changed = phases.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let phase = *phases.borrow_and_update();
                debug!("Poll phase: {}", phase);
                if phase == PollPhase::Stopped {
                    bail!("Polling stopped. Save a new token with `airdash config set-token <TOKEN>`.");
                }
            }
        }
    }
}
