//! CLI command handlers

pub mod listen;
pub mod send;

use herald_broadcast::CancellationToken;

/// Token that fires on the first Ctrl-C
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; canceling");
            trigger.cancel();
        }
    });
    cancel
}
