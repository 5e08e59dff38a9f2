//! Request-facing notification endpoint
//!
//! Accepts a notification request, broadcasts it to every reliable node and
//! acknowledges. Partial delivery is still a successful response; failed nodes
//! are logged.

use crate::coordinator::BroadcastCoordinator;
use crate::outcome::{BroadcastResult, BroadcastStatus};
use herald_core::{BroadcastError, NotificationRequest, NotificationResponse};
use tokio_util::sync::CancellationToken;

/// Handles inbound notification requests
#[derive(Debug, Clone)]
pub struct NotificationEndpoint {
    coordinator: BroadcastCoordinator,
}

impl NotificationEndpoint {
    /// Create an endpoint backed by `coordinator`
    pub fn new(coordinator: BroadcastCoordinator) -> Self {
        Self { coordinator }
    }

    /// Process a notification request and acknowledge it.
    pub async fn process_notification(
        &self,
        request: NotificationRequest,
        cancel: &CancellationToken,
    ) -> Result<NotificationResponse, BroadcastError> {
        self.dispatch(request, cancel).await?;
        Ok(NotificationResponse::default())
    }

    /// Process a notification request and return the full broadcast result.
    pub async fn dispatch(
        &self,
        request: NotificationRequest,
        cancel: &CancellationToken,
    ) -> Result<BroadcastResult, BroadcastError> {
        let message = request.to_message();
        let result = self
            .coordinator
            .broadcast_to_reliable(message, cancel)
            .await?;

        match result.status() {
            BroadcastStatus::Empty => tracing::info!("Notification accepted; no reliable nodes"),
            BroadcastStatus::Delivered => {
                tracing::info!(delivered = result.succeeded(), "Notification delivered to all nodes");
            }
            BroadcastStatus::Partial | BroadcastStatus::Failed => {
                let breakdown = result.breakdown();
                tracing::warn!(
                    delivered = result.succeeded(),
                    failed = result.failed(),
                    not_found = breakdown.not_found,
                    delivery_failed = breakdown.delivery_failed,
                    timed_out = breakdown.timed_out,
                    canceled = breakdown.canceled,
                    aborted = breakdown.aborted,
                    "Notification not delivered to every node"
                );
                for failure in result.failures() {
                    tracing::debug!(node = %failure.node_id, cause = %failure.cause, "Undelivered node");
                }
            }
        }

        Ok(result)
    }
}
