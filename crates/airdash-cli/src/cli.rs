//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use airdash_core::TemperatureUnit;
use airdash_core::client::DEFAULT_BASE_URL;
use airdash_core::poller::DEFAULT_REFRESH_INTERVAL;

/// Terminal dashboard for AirGradient air quality monitors
#[derive(Debug, Parser)]
#[command(name = "airdash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: <config dir>/airdash/settings.toml)
    #[arg(long, global = true, env = "AIRDASH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Poll the API and redraw the dashboard on every refresh
    Watch {
        #[command(flatten)]
        api: ApiArgs,

        /// Refresh interval in seconds
        #[arg(short, long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
        interval: u64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch current measures once and print them
    Read {
        #[command(flatten)]
        api: ApiArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Reusable API connection arguments
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// API token, or use AIRDASH_TOKEN env var (remembered for next time)
    #[arg(short, long, env = "AIRDASH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API base URL (point this at a proxy if needed)
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

/// Reusable output arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Print the enriched batch as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Use Fahrenheit for temperature display (overrides --celsius and settings)
    #[arg(long, conflicts_with = "celsius")]
    pub fahrenheit: bool,

    /// Use Celsius for temperature display (overrides settings)
    #[arg(long, conflicts_with = "fahrenheit")]
    pub celsius: bool,
}

impl OutputArgs {
    /// Resolve the temperature unit: explicit flags override the saved one.
    pub fn resolve_unit(&self, saved: TemperatureUnit) -> TemperatureUnit {
        if self.fahrenheit {
            TemperatureUnit::Fahrenheit
        } else if self.celsius {
            TemperatureUnit::Celsius
        } else {
            saved
        }
    }
}

/// Settings subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show saved settings
    Show,

    /// Show settings file path
    Path,

    /// Save the API token
    SetToken {
        /// Token from the AirGradient dashboard
        token: String,
    },

    /// Set the temperature unit (celsius or fahrenheit)
    Unit {
        /// Unit name (`c` and `f` also work)
        unit: TemperatureUnit,
    },

    /// Switch between Celsius and Fahrenheit
    ToggleUnit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::try_parse_from(["airdash", "watch", "--token", "abc"]).unwrap();
        let Commands::Watch {
            api,
            interval,
            output,
        } = cli.command
        else {
            panic!("expected watch");
        };
        assert_eq!(api.token.as_deref(), Some("abc"));
        assert_eq!(api.base_url, "https://api.airgradient.com");
        assert_eq!(interval, 120);
        assert!(!output.json);
        assert_eq!(
            output.resolve_unit(TemperatureUnit::Fahrenheit),
            TemperatureUnit::Fahrenheit
        );
    }

    #[test]
    fn test_unit_flags_conflict() {
        let result = Cli::try_parse_from(["airdash", "read", "--fahrenheit", "--celsius"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_flag_overrides_saved() {
        let cli = Cli::try_parse_from(["airdash", "read", "--celsius"]).unwrap();
        let Commands::Read { output, .. } = cli.command else {
            panic!("expected read");
        };
        assert_eq!(
            output.resolve_unit(TemperatureUnit::Fahrenheit),
            TemperatureUnit::Celsius
        );
    }

    #[test]
    fn test_config_unit_parses_short_names() {
        let cli = Cli::try_parse_from(["airdash", "config", "unit", "f"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Unit {
                    unit: TemperatureUnit::Fahrenheit
                }
            }
        ));

        assert!(Cli::try_parse_from(["airdash", "config", "unit", "kelvin"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["airdash", "-v", "-q", "config", "show"]).is_err());
    }
}
