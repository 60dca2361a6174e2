//! Read command implementation.

use anyhow::{Result, bail};
use time::{OffsetDateTime, UtcOffset};
use tracing::info;

use airdash_core::notify::AUTH_FAILED_MESSAGE;
use airdash_core::processor::process_batch;
use airdash_core::settings::load_temperature_unit;
use airdash_core::{ApiClient, SettingsStore};

use crate::cli::{ApiArgs, OutputArgs};
use crate::format::FormatOptions;
use crate::output::render_batch;

use super::resolve_token;

/// Arguments for the read command.
pub struct ReadArgs<'a> {
    pub api: &'a ApiArgs,
    pub output: &'a OutputArgs,
    pub settings: &'a dyn SettingsStore,
    pub offset: UtcOffset,
}

/// Fetch once, enrich, and print.
pub async fn cmd_read(args: ReadArgs<'_>) -> Result<()> {
    let ReadArgs {
        api,
        output,
        settings,
        offset,
    } = args;

    let token = resolve_token(api.token.as_deref(), settings)?;
    let unit = output.resolve_unit(load_temperature_unit(settings));
    let client = ApiClient::new(&api.base_url)?;

    info!("Fetching current measures from {}", client.base_url());
    let readings = match client.fetch_current(&token).await {
        Ok(readings) => readings,
        Err(e) if e.is_auth() => bail!(AUTH_FAILED_MESSAGE),
        Err(e) => return Err(e.into()),
    };

    let batch = process_batch(readings);
    let today = OffsetDateTime::now_utc().to_offset(offset).date();
    let opts = FormatOptions::new(unit, output.no_color, offset, today);
    print!("{}", render_batch(&batch, &opts, output.json)?);
    Ok(())
}
