use anyhow::Result;
use clap::Parser;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use airdash_cli::cli::{Cli, Commands};
use airdash_cli::commands::{ReadArgs, WatchArgs, cmd_config, cmd_read, cmd_watch};
use airdash_cli::config::FileSettings;

fn main() -> Result<()> {
    // The local offset can only be read while the process is single-threaded,
    // so look it up before the runtime starts its workers.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let cli = Cli::parse();

    tokio::runtime::Runtime::new()?.block_on(run(cli, offset))
}

async fn run(cli: Cli, offset: UtcOffset) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => FileSettings::open(path),
        None => FileSettings::open_default(),
    };

    match cli.command {
        Commands::Watch {
            api,
            interval,
            output,
        } => {
            cmd_watch(WatchArgs {
                api: &api,
                interval,
                output: &output,
                settings: &settings,
                offset,
            })
            .await
        }
        Commands::Read { api, output } => {
            cmd_read(ReadArgs {
                api: &api,
                output: &output,
                settings: &settings,
                offset,
            })
            .await
        }
        Commands::Config { action } => cmd_config(action, &settings, cli.quiet),
    }
}
