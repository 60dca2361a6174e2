//! AirDash Service - CORS proxy for the AirGradient API.
//!
//! Run with: `cargo run -p airdash-service`

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use airdash_service::{AppState, Config, api};

/// AirDash Service - CORS proxy and static file server.
#[derive(Parser, Debug)]
#[command(name = "airdash-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream API base URL (overrides config).
    #[arg(short, long)]
    upstream: Option<String>,

    /// Directory of static files to serve (overrides config).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airdash_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(upstream) = args.upstream {
        config.upstream.base_url = upstream;
    }
    if let Some(dir) = args.static_dir {
        config.static_files.dir = Some(dir);
    }
    config.validate()?;

    info!("Forwarding to {}", config.upstream.base_url);
    if let Some(dir) = &config.static_files.dir {
        info!("Serving static files from {}", dir.display());
    }

    // Bind by string so host names like "localhost:3001" resolve.
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    let addr = listener.local_addr()?;
    let app = api::app(AppState::new(config)?);

    info!("Starting proxy on http://{}", addr);
    info!(
        "API endpoint: http://{}{}?token=YOUR_TOKEN",
        addr,
        api::PROXY_MEASURES_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
}
