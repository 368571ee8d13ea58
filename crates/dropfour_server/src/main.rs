//! dropfour - Unified CLI
//!
//! Runs the four-in-a-row room server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use dropfour_server::{RoomRegistry, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match cli.command.config_path() {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(cli.command.overrides())?;

    match cli.command {
        Command::Serve { .. } => run_server(config).await,
        Command::Config { .. } => {
            print!("{}", toml::to_string(&config)?);
            Ok(())
        }
    }
}

/// Run the HTTP / WebSocket game server
#[instrument(skip(config))]
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting dropfour server");

    let registry = RoomRegistry::new(&config);
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "Server ready");

    axum::serve(listener, app).await?;

    Ok(())
}
