//! Command implementations for the CLI.

mod config;
mod read;
mod watch;

pub use config::cmd_config;
pub use read::{ReadArgs, cmd_read};
pub use watch::{WatchArgs, cmd_watch};

use anyhow::{Result, bail};
use tracing::debug;

use airdash_core::SettingsStore;
use airdash_core::settings::{remember_token, saved_token};

/// Pick the token to use: an explicit one (flag or env) wins over the saved
/// one. An explicit token that differs from the saved one is remembered.
pub(crate) fn resolve_token(explicit: Option<&str>, store: &dyn SettingsStore) -> Result<String> {
    let saved = saved_token(store);

    match explicit.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => {
            if saved.as_deref() != Some(token) {
                remember_token(store, token)?;
                debug!("Remembered new API token");
            }
            Ok(token.to_string())
        }
        None => match saved {
            Some(token) => Ok(token),
            None => bail!(
                "No API token. Pass --token, set AIRDASH_TOKEN, or run `airdash config set-token <TOKEN>`."
            ),
        },
    }
}
