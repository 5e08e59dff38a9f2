//! Broadcast coordinator
//!
//! Fans a notification out to a node set through a fixed-size pool of worker
//! tasks. Workers drain a shared queue of node identities; for each node they
//! resolve contact info, deliver under a per-node deadline and report one
//! outcome on a channel drained by the coordinator.
//!
//! Per node: `Pending -> Resolving -> {NodeNotFound | Delivering} ->
//! {Delivered | DeliveryFailed | TimedOut | Canceled}`. Nothing is retried.
//!
//! Once the cancellation token fires, in-flight resolutions and deliveries are
//! dropped and every node still queued is recorded as canceled without a call
//! to the delivery client. All workers are joined before a broadcast returns.

use crate::outcome::{BroadcastResult, DeliveryFailure, DeliveryOutcome};
use herald_core::{
    BroadcastConfig, BroadcastError, DeliveryEffects, MembershipEffects, MembershipError, NodeId,
    NotificationMessage,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Runs bounded, best-effort notification broadcasts
///
/// Holds no state between invocations beyond its configuration and
/// collaborators.
#[derive(Clone)]
pub struct BroadcastCoordinator {
    config: BroadcastConfig,
    membership: Arc<dyn MembershipEffects>,
    delivery: Arc<dyn DeliveryEffects>,
}

impl std::fmt::Debug for BroadcastCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BroadcastCoordinator {
    /// Create a coordinator, rejecting configurations it cannot run with
    pub fn new(
        config: BroadcastConfig,
        membership: Arc<dyn MembershipEffects>,
        delivery: Arc<dyn DeliveryEffects>,
    ) -> Result<Self, BroadcastError> {
        config.validate()?;
        Ok(Self {
            config,
            membership,
            delivery,
        })
    }

    /// List the reliable node set and broadcast `message` to it.
    ///
    /// Fails only when the listing fails; nothing is delivered in that case.
    /// If `cancel` fires before the listing completes, the result is empty.
    pub async fn broadcast_to_reliable(
        &self,
        message: NotificationMessage,
        cancel: &CancellationToken,
    ) -> Result<BroadcastResult, BroadcastError> {
        let listing = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Broadcast canceled before the reliable node set was listed");
                return Ok(BroadcastResult::empty());
            }
            listing = self.membership.list_reliable() => listing,
        };

        let identities = listing.map_err(|e| {
            tracing::warn!(error = %e, "Could not list reliable nodes; nothing broadcast");
            BroadcastError::from(e)
        })?;

        Ok(self.broadcast(message, identities, cancel).await)
    }

    /// Broadcast `message` to `identities`, returning one outcome per distinct node.
    ///
    /// Never fails: resolution failures, delivery failures, deadlines and
    /// cancellation are all recorded per node in the result.
    pub async fn broadcast(
        &self,
        message: NotificationMessage,
        identities: impl IntoIterator<Item = NodeId>,
        cancel: &CancellationToken,
    ) -> BroadcastResult {
        let targets: BTreeSet<NodeId> = identities.into_iter().collect();
        if targets.is_empty() {
            tracing::info!("No reliable nodes to notify");
            return BroadcastResult::empty();
        }

        let span = tracing::info_span!(
            "broadcast",
            nodes = targets.len(),
            message_len = message.len()
        );
        self.fan_out(message, targets, cancel).instrument(span).await
    }

    async fn fan_out(
        &self,
        message: NotificationMessage,
        targets: BTreeSet<NodeId>,
        cancel: &CancellationToken,
    ) -> BroadcastResult {
        let worker_count = self.config.max_concurrent_deliveries.min(targets.len());
        let queue = Arc::new(Mutex::new(targets.iter().copied().collect::<VecDeque<_>>()));
        let message = Arc::new(message);
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

        tracing::debug!(workers = worker_count, "Starting delivery workers");
        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            let worker = DeliveryWorker {
                membership: Arc::clone(&self.membership),
                delivery: Arc::clone(&self.delivery),
                message: Arc::clone(&message),
                queue: Arc::clone(&queue),
                timeout: self.config.delivery_timeout(),
                cancel: cancel.clone(),
                outcomes: outcome_tx.clone(),
            };
            workers.spawn(worker.run().in_current_span());
        }
        drop(outcome_tx);

        // The channel closes once every worker has exited.
        let mut outcomes = BTreeMap::new();
        while let Some(outcome) = outcome_rx.recv().await {
            outcomes.insert(outcome.node_id, outcome);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Delivery worker terminated abnormally");
            }
        }

        for node_id in &targets {
            outcomes
                .entry(*node_id)
                .or_insert_with(|| DeliveryOutcome::failed(*node_id, DeliveryFailure::WorkerAborted));
        }

        let result = BroadcastResult::from_outcomes(outcomes.into_values());
        tracing::info!(
            attempted = result.attempted(),
            succeeded = result.succeeded(),
            failed = result.failed(),
            canceled = cancel.is_cancelled(),
            "Broadcast complete"
        );
        result
    }
}

/// One member of the delivery pool
struct DeliveryWorker {
    membership: Arc<dyn MembershipEffects>,
    delivery: Arc<dyn DeliveryEffects>,
    message: Arc<NotificationMessage>,
    queue: Arc<Mutex<VecDeque<NodeId>>>,
    timeout: Duration,
    cancel: CancellationToken,
    outcomes: mpsc::UnboundedSender<DeliveryOutcome>,
}

impl DeliveryWorker {
    async fn run(self) {
        while let Some(node_id) = self.next_target() {
            let result = if self.cancel.is_cancelled() {
                Err(DeliveryFailure::Canceled)
            } else {
                self.attempt(node_id).await
            };

            match &result {
                Ok(()) => tracing::debug!(node = %node_id, "Notification delivered"),
                Err(DeliveryFailure::Canceled) => {
                    tracing::debug!(node = %node_id, "Notification canceled");
                }
                Err(failure) => {
                    tracing::warn!(node = %node_id, error = %failure, "Notification not delivered");
                }
            }

            if self.outcomes.send(DeliveryOutcome { node_id, result }).is_err() {
                break;
            }
        }
    }

    fn next_target(&self) -> Option<NodeId> {
        self.queue.lock().pop_front()
    }

    async fn attempt(&self, node_id: NodeId) -> Result<(), DeliveryFailure> {
        let timeout_ms = self.timeout.as_millis().try_into().unwrap_or(u64::MAX);
        let exchange = async {
            let node = self.membership.resolve(node_id).await.map_err(|e| {
                if let MembershipError::Unavailable { reason } = &e {
                    tracing::debug!(node = %node_id, reason = %reason, "Resolution failed");
                }
                DeliveryFailure::NodeNotFound
            })?;
            tracing::debug!(node = %node_id, address = %node.address, "Delivering notification");
            self.delivery
                .deliver(&node, &self.message)
                .await
                .map_err(DeliveryFailure::from)
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DeliveryFailure::Canceled),
            result = tokio::time::timeout(self.timeout, exchange) => {
                result.unwrap_or(Err(DeliveryFailure::TimedOut { timeout_ms }))
            }
        }
    }
}
