//! Command-line interface for dropfour.

use clap::{Parser, Subcommand};
use dropfour_server::ConfigOverrides;

/// dropfour - real-time four-in-a-row game server
#[derive(Parser, Debug)]
#[command(name = "dropfour")]
#[command(about = "Room-based four-in-a-row server over WebSockets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Board width for new rooms
        #[arg(long)]
        columns: Option<usize>,

        /// Board height for new rooms
        #[arg(long)]
        rows: Option<usize>,

        /// Seconds before an empty room is deleted
        #[arg(long)]
        expiry_secs: Option<u64>,
    },

    /// Print the effective configuration as TOML and exit
    Config {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}

impl Command {
    /// Config file path given on the command line, if any.
    pub fn config_path(&self) -> Option<&std::path::Path> {
        match self {
            Command::Serve { config, .. } | Command::Config { config } => config.as_deref(),
        }
    }

    /// Flags that override config file values.
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Command::Serve {
                host,
                port,
                columns,
                rows,
                expiry_secs,
                ..
            } => ConfigOverrides {
                host: host.clone(),
                port: *port,
                columns: *columns,
                rows: *rows,
                expiry_secs: *expiry_secs,
            },
            Command::Config { .. } => ConfigOverrides::default(),
        }
    }
}
