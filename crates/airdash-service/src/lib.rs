//! CORS proxy and static file server for the AirGradient public API.
//!
//! This crate provides a small HTTP server that:
//! - Forwards the current-measures endpoint to the AirGradient API
//! - Adds permissive CORS headers so browser dashboards can call it
//! - Serves a directory of static files (the dashboard itself)
//!
//! # Configuration
//!
//! The server reads configuration from `~/.config/airdash/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3001"
//!
//! [upstream]
//! base_url = "https://api.airgradient.com"
//! timeout_secs = 10
//!
//! [static_files]
//! dir = "/srv/airdash"
//! ```

pub mod api;
pub mod config;
pub mod state;

pub use config::{
    Config, ConfigError, ServerConfig, StaticFilesConfig, UpstreamConfig, ValidationError,
};
pub use state::AppState;
