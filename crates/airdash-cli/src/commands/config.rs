//! Config command implementation.

use anyhow::Result;

use airdash_core::settings::{
    load_temperature_unit, remember_token, save_temperature_unit, saved_token,
    toggle_temperature_unit,
};

use crate::cli::ConfigAction;
use crate::config::{FileSettings, mask_token};
use crate::format::format_success;

pub fn cmd_config(action: ConfigAction, settings: &FileSettings, quiet: bool) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Settings file:    {}", settings.path().display());
            match saved_token(settings) {
                Some(token) => println!("API token:        {}", mask_token(&token)),
                None => println!("API token:        (not set)"),
            }
            println!("Temperature unit: {}", load_temperature_unit(settings));
        }
        ConfigAction::Path => {
            println!("{}", settings.path().display());
        }
        ConfigAction::SetToken { token } => {
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("Token cannot be empty");
            }
            remember_token(settings, token)?;
            report(&format!("Saved API token {}", mask_token(token)), quiet);
        }
        ConfigAction::Unit { unit } => {
            save_temperature_unit(settings, unit)?;
            report(&format!("Temperature unit set to {}", unit), quiet);
        }
        ConfigAction::ToggleUnit => {
            let unit = toggle_temperature_unit(settings)?;
            report(
                &format!("Temperature unit set to {} ({})", unit, unit.symbol()),
                quiet,
            );
        }
    }
    Ok(())
}

fn report(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", format_success(message, false));
    }
}
