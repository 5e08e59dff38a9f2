//! Operator CLI for Herald
//!
//! Broadcasts a notification to every reliable node in a roster, or listens for
//! notifications as a node would.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    listen::{handle_listen_command, ListenCommand},
    send::{handle_send_command, SendCommand},
};

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Herald - broadcast operator notifications to storage nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (missing file means built-in defaults)
    #[arg(short, long, global = true, default_value = "herald.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Broadcast a notification to every reliable node
    Send(SendCommand),
    /// Receive notifications and log them
    Listen(ListenCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Send(cmd) => handle_send_command(cmd, &cli.config).await,
        Commands::Listen(cmd) => handle_listen_command(cmd).await,
    }
}
