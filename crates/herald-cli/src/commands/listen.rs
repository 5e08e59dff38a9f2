//! `herald listen`: receive notifications as a node

use anyhow::{Context, Result};
use clap::Args;
use herald_effects::NotificationListener;
use tokio::sync::mpsc;
use tracing::info;

/// Listen for notifications and log each one
#[derive(Args)]
pub struct ListenCommand {
    /// Address to accept notifications on
    #[arg(long, default_value = "127.0.0.1:7777")]
    pub bind: String,
}

/// Handle listen command execution
pub async fn handle_listen_command(cmd: ListenCommand) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(64);
    let listener = NotificationListener::bind(cmd.bind.as_str(), tx)
        .await
        .with_context(|| format!("Failed to bind {}", cmd.bind))?;
    let cancel = super::cancel_on_ctrl_c();

    let printer = tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            info!(peer = %notification.peer, "Notification received");
            println!("{}", notification.message);
        }
    });

    listener.run(cancel).await?;
    printer.await?;
    Ok(())
}
