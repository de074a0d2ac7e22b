//! practice-deck server - Entry Point

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use practice_deck::{config::Config, server::Server};

#[derive(Parser, Debug)]
#[command(name = "practice-deck")]
#[command(about = "YouTube and Spotify sign-in and API access for the practice-deck UI")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: IpAddr,

    /// HTTP server port
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside local development.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = dotenv_loaded,
        "Starting practice-deck server"
    );

    let config = Config::from_env()?;
    tracing::info!(environment = ?config.environment, "Loaded configuration");

    let server = Server::new(config)?;
    server.run(SocketAddr::new(cli.host, cli.port)).await?;

    Ok(())
}
