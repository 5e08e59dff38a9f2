//! `herald send`: broadcast one notification

use crate::config::{load_config, ConfigOverrides};
use anyhow::{Context, Result};
use clap::Args;
use herald_broadcast::{BroadcastCoordinator, BroadcastResult, NotificationEndpoint};
use herald_core::NotificationRequest;
use herald_effects::{RosterMembershipHandler, TcpDeliveryHandler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Broadcast a notification to every reliable node in a roster
#[derive(Args)]
pub struct SendCommand {
    /// Notification text
    #[arg(short, long)]
    pub message: String,

    /// Roster of known nodes (TOML, `[[nodes]]` with id, address, reliable)
    #[arg(short, long, default_value = "nodes.toml")]
    pub roster: PathBuf,

    /// Maximum deliveries in flight at once
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Per-node deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle send command execution
pub async fn handle_send_command(cmd: SendCommand, config_path: &Path) -> Result<()> {
    let config = load_config(
        config_path,
        ConfigOverrides {
            max_concurrency: cmd.max_concurrency,
            timeout_ms: cmd.timeout_ms,
        },
    )?;
    let membership = RosterMembershipHandler::from_toml_file(&cmd.roster)
        .with_context(|| format!("Failed to load roster {}", cmd.roster.display()))?;
    info!(
        nodes = membership.len(),
        max_concurrency = config.max_concurrent_deliveries,
        timeout_ms = config.delivery_timeout_ms,
        "Sending notification"
    );

    let coordinator = BroadcastCoordinator::new(
        config,
        Arc::new(membership),
        Arc::new(TcpDeliveryHandler::new()),
    )?;
    let endpoint = NotificationEndpoint::new(coordinator);
    let cancel = super::cancel_on_ctrl_c();

    let result = endpoint
        .dispatch(NotificationRequest::new(cmd.message.into_bytes()), &cancel)
        .await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &BroadcastResult) {
    println!(
        "attempted: {}  delivered: {}  failed: {}",
        result.attempted(),
        result.succeeded(),
        result.failed()
    );
    for failure in result.failures() {
        println!("  {}  {}", failure.node_id, failure.cause);
    }
}
