//! # Tide Forecast Service Entry Point
//!
//! This binary loads configuration, initializes logging and either serves the
//! tide forecast HTTP API or, in development mode, fetches one forecast and
//! prints it to stdout.
//!
//! # Environment Variables
//! - `RUST_LOG` (optional): tracing filter (default: `info,tower_http=debug`)

// Test modules
#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tide_forecast_lib::config::{Config, CONFIG_FILE};
use tide_forecast_lib::forecast::fetch_tide_data;
use tide_forecast_lib::noaa::NoaaClient;
use tide_forecast_lib::server::{self, local_now, AppState};

/// Serve NOAA tide predictions for US coastal locations
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Fetch one forecast for this location and print it (implies --stdout)
    #[arg(long)]
    location: Option<String>,

    /// Development mode: print a single forecast as JSON instead of serving
    #[arg(long)]
    stdout: bool,

    /// Write the default configuration to --config and exit.
    /// Refuses to overwrite an existing file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.init_config {
        return Config::default().create_at_path(&args.config);
    }

    let config = Config::load_from_path(&args.config);

    // Development mode: one forecast as pretty JSON
    if args.stdout || args.location.is_some() {
        let location = args
            .location
            .unwrap_or_else(|| config.forecast.default_location.clone());
        return print_forecast(&config, &location).await;
    }

    serve(config).await
}

async fn print_forecast(config: &Config, location: &str) -> anyhow::Result<()> {
    let client = NoaaClient::new(config.noaa.base_url.clone(), config.noaa.timeout())
        .context("build NOAA client")?;
    let data = fetch_tide_data(&client, location, local_now())
        .await
        .with_context(|| format!("fetch tide data for {location}"))?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind))?;

    let state = AppState::from_config(&config).context("build NOAA client")?;
    let app = server::router(state);

    tracing::info!(
        "Serving tides for {:?} (NOAA: {}, cache TTL: {} min)",
        config.forecast.default_location,
        config.noaa.base_url,
        config.cache.ttl_minutes
    );
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Initialize the global tracing subscriber.
///
/// Uses `RUST_LOG` when set, otherwise logs at info with request spans from
/// `tower_http` at debug. Logs go to stderr so `--stdout` output stays clean JSON.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
