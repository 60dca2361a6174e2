//! Terminal dashboard for AirGradient air quality monitors.
//!
//! The `airdash` binary polls the AirGradient public API, derives US AQI and
//! heat index for every location, and prints colour-coded cards grouped into
//! indoor and outdoor sections.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `watch` | Poll on an interval and print each refresh |
//! | `read` | Fetch and print once |
//! | `config` | Show or change saved settings |
//!
//! # Configuration
//!
//! The API token and temperature unit are saved in
//! `~/.config/airdash/settings.toml` (or the path given by `--config` /
//! `AIRDASH_CONFIG`). A token passed with `--token` or `AIRDASH_TOKEN` is saved
//! for later runs.

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod output;
