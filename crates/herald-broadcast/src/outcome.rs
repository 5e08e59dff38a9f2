//! Per-node outcomes and the aggregate broadcast result
//!
//! A broadcast produces exactly one [`DeliveryOutcome`] per target node. The
//! aggregate is keyed by node identity; completion order is not kept.

use herald_core::{DeliveryError, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a node did not receive the notification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFailure {
    /// The node was listed but could not be resolved to contact info
    #[error("node not found")]
    NodeNotFound,
    /// The delivery client reported a transport or remote failure
    #[error("delivery failed: {error}")]
    DeliveryFailed {
        /// Error reported by the delivery client
        error: DeliveryError,
    },
    /// Resolution plus delivery did not finish within the per-node deadline
    #[error("timed out after {timeout_ms}ms")]
    TimedOut {
        /// Deadline that elapsed
        timeout_ms: u64,
    },
    /// The broadcast was canceled before this node finished
    #[error("canceled")]
    Canceled,
    /// The worker handling this node stopped without reporting
    #[error("delivery worker aborted")]
    WorkerAborted,
}

impl From<DeliveryError> for DeliveryFailure {
    fn from(error: DeliveryError) -> Self {
        match error {
            DeliveryError::Timeout { timeout_ms } => Self::TimedOut { timeout_ms },
            error => Self::DeliveryFailed { error },
        }
    }
}

/// Terminal result of one node's delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Target node
    pub node_id: NodeId,
    /// `Ok` when the node acknowledged the notification
    pub result: Result<(), DeliveryFailure>,
}

impl DeliveryOutcome {
    /// Outcome for a node that received the notification
    pub fn delivered(node_id: NodeId) -> Self {
        Self {
            node_id,
            result: Ok(()),
        }
    }

    /// Outcome for a node that did not
    pub fn failed(node_id: NodeId, failure: DeliveryFailure) -> Self {
        Self {
            node_id,
            result: Err(failure),
        }
    }

    /// Whether the node received the notification
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// Failure cause, if any
    pub fn error(&self) -> Option<&DeliveryFailure> {
        self.result.as_ref().err()
    }
}

/// A node that did not receive the notification, with the cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
    /// Node that failed
    pub node_id: NodeId,
    /// Cause of the failure
    pub cause: DeliveryFailure,
}

/// Overall classification of a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    /// There were no nodes to deliver to
    Empty,
    /// Every node received the notification
    Delivered,
    /// Some nodes received it, some did not
    Partial,
    /// No node received it
    Failed,
}

/// Failure counts per cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBreakdown {
    /// Nodes that could not be resolved
    pub not_found: usize,
    /// Nodes whose delivery client reported an error
    pub delivery_failed: usize,
    /// Nodes that exceeded the per-node deadline
    pub timed_out: usize,
    /// Nodes cut off by cancellation
    pub canceled: usize,
    /// Nodes lost to an aborted worker
    pub aborted: usize,
}

/// Aggregate over every outcome of one broadcast
///
/// `attempted == succeeded + failed` always holds, and `attempted` equals the
/// number of distinct target nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    attempted: usize,
    succeeded: usize,
    failed: usize,
    delivered: Vec<NodeId>,
    failures: Vec<NodeFailure>,
}

impl BroadcastResult {
    /// Result of a broadcast with no targets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aggregate outcomes, keeping one outcome per node (the last one seen)
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = DeliveryOutcome>) -> Self {
        let by_node: BTreeMap<NodeId, Result<(), DeliveryFailure>> = outcomes
            .into_iter()
            .map(|outcome| (outcome.node_id, outcome.result))
            .collect();

        let mut delivered = Vec::new();
        let mut failures = Vec::new();
        for (node_id, result) in by_node {
            match result {
                Ok(()) => delivered.push(node_id),
                Err(cause) => failures.push(NodeFailure { node_id, cause }),
            }
        }

        Self {
            attempted: delivered.len() + failures.len(),
            succeeded: delivered.len(),
            failed: failures.len(),
            delivered,
            failures,
        }
    }

    /// Number of nodes a delivery was attempted for
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of nodes that received the notification
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of nodes that did not
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Nodes that received the notification, sorted by identity
    pub fn delivered(&self) -> &[NodeId] {
        &self.delivered
    }

    /// Nodes that did not, sorted by identity
    pub fn failures(&self) -> &[NodeFailure] {
        &self.failures
    }

    /// Failure cause for `node_id`, if it failed
    pub fn failure_for(&self, node_id: NodeId) -> Option<&DeliveryFailure> {
        self.failures
            .binary_search_by_key(&node_id, |failure| failure.node_id)
            .ok()
            .map(|index| &self.failures[index].cause)
    }

    /// Failure counts per cause
    pub fn breakdown(&self) -> FailureBreakdown {
        let mut breakdown = FailureBreakdown::default();
        for failure in &self.failures {
            match failure.cause {
                DeliveryFailure::NodeNotFound => breakdown.not_found += 1,
                DeliveryFailure::DeliveryFailed { .. } => breakdown.delivery_failed += 1,
                DeliveryFailure::TimedOut { .. } => breakdown.timed_out += 1,
                DeliveryFailure::Canceled => breakdown.canceled += 1,
                DeliveryFailure::WorkerAborted => breakdown.aborted += 1,
            }
        }
        breakdown
    }

    /// Overall classification
    pub fn status(&self) -> BroadcastStatus {
        match (self.succeeded, self.failed) {
            (0, 0) => BroadcastStatus::Empty,
            (_, 0) => BroadcastStatus::Delivered,
            (0, _) => BroadcastStatus::Failed,
            _ => BroadcastStatus::Partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_testkit::node_id;
    use proptest::prelude::*;

    fn failure_strategy() -> impl Strategy<Value = Option<DeliveryFailure>> {
        prop_oneof![
            Just(None),
            Just(Some(DeliveryFailure::NodeNotFound)),
            Just(Some(DeliveryFailure::Canceled)),
            Just(Some(DeliveryFailure::TimedOut { timeout_ms: 5 })),
            Just(Some(DeliveryFailure::DeliveryFailed {
                error: DeliveryError::send_failed("broken pipe"),
            })),
        ]
    }

    proptest! {
        #[test]
        fn counts_always_add_up(results in proptest::collection::vec(failure_strategy(), 0..64)) {
            let outcomes = results.iter().enumerate().map(|(index, failure)| match failure {
                None => DeliveryOutcome::delivered(node_id(index)),
                Some(cause) => DeliveryOutcome::failed(node_id(index), cause.clone()),
            });
            let result = BroadcastResult::from_outcomes(outcomes);

            prop_assert_eq!(result.attempted(), results.len());
            prop_assert_eq!(result.attempted(), result.succeeded() + result.failed());
            prop_assert_eq!(result.succeeded(), results.iter().filter(|r| r.is_none()).count());

            let breakdown = result.breakdown();
            prop_assert_eq!(
                breakdown.not_found + breakdown.delivery_failed + breakdown.timed_out
                    + breakdown.canceled + breakdown.aborted,
                result.failed()
            );
        }
    }

    #[test]
    fn duplicate_outcomes_collapse_to_one_per_node() {
        let result = BroadcastResult::from_outcomes([
            DeliveryOutcome::failed(node_id(0), DeliveryFailure::Canceled),
            DeliveryOutcome::delivered(node_id(0)),
        ]);
        assert_eq!(result.attempted(), 1);
        assert_eq!(result.delivered(), &[node_id(0)]);
    }

    #[test]
    fn status_distinguishes_full_partial_and_total_failure() {
        assert_eq!(BroadcastResult::empty().status(), BroadcastStatus::Empty);

        let all = BroadcastResult::from_outcomes([DeliveryOutcome::delivered(node_id(0))]);
        assert_eq!(all.status(), BroadcastStatus::Delivered);

        let some = BroadcastResult::from_outcomes([
            DeliveryOutcome::delivered(node_id(0)),
            DeliveryOutcome::failed(node_id(1), DeliveryFailure::NodeNotFound),
        ]);
        assert_eq!(some.status(), BroadcastStatus::Partial);
        assert_eq!(
            some.failure_for(node_id(1)),
            Some(&DeliveryFailure::NodeNotFound)
        );
        assert_eq!(some.failure_for(node_id(0)), None);

        let none = BroadcastResult::from_outcomes([DeliveryOutcome::failed(
            node_id(0),
            DeliveryFailure::Canceled,
        )]);
        assert_eq!(none.status(), BroadcastStatus::Failed);
    }

    #[test]
    fn client_timeout_is_reported_as_timed_out() {
        let failure = DeliveryFailure::from(DeliveryError::Timeout { timeout_ms: 30 });
        assert_eq!(failure, DeliveryFailure::TimedOut { timeout_ms: 30 });
    }

    #[test]
    fn result_serializes_for_operator_output() {
        let result = BroadcastResult::from_outcomes([
            DeliveryOutcome::delivered(node_id(0)),
            DeliveryOutcome::failed(node_id(1), DeliveryFailure::Canceled),
        ]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["attempted"], 2);
        assert_eq!(json["failures"][0]["cause"], "canceled");
    }
}
