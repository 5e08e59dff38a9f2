//! Scripted, instrumented delivery client

use async_trait::async_trait;
use herald_core::{DeliveryEffects, DeliveryError, NodeId, NodeInfo, NotificationMessage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted delivery does when called for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryBehavior {
    /// Return success immediately
    Succeed,
    /// Return the given error immediately
    Fail(DeliveryError),
    /// Sleep, then succeed
    Delay(Duration),
    /// Never complete; only cancellation or a deadline ends the call
    Hang,
    /// Panic inside the call, taking the calling task down with it
    Panic,
}

/// Delivery fake that records every call
///
/// `in_flight` counts calls that have started and not yet finished or been
/// dropped, so it returns to zero once every delivery future is gone.
#[derive(Debug)]
pub struct ScriptedDelivery {
    default_behavior: DeliveryBehavior,
    behaviors: Mutex<HashMap<NodeId, DeliveryBehavior>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delivered: Mutex<Vec<(NodeId, NotificationMessage)>>,
}

impl ScriptedDelivery {
    /// Delivery fake applying `behavior` to nodes without a specific script
    pub fn new(default_behavior: DeliveryBehavior) -> Self {
        Self {
            default_behavior,
            behaviors: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Every delivery succeeds
    pub fn succeeding() -> Self {
        Self::new(DeliveryBehavior::Succeed)
    }

    /// Every delivery takes `delay` and then succeeds
    pub fn delayed(delay: Duration) -> Self {
        Self::new(DeliveryBehavior::Delay(delay))
    }

    /// Script a behavior for one node
    pub fn script(self, node_id: NodeId, behavior: DeliveryBehavior) -> Self {
        self.behaviors.lock().insert(node_id, behavior);
        self
    }

    /// Script the same behavior for several nodes
    pub fn script_all(self, node_ids: &[NodeId], behavior: DeliveryBehavior) -> Self {
        {
            let mut behaviors = self.behaviors.lock();
            for id in node_ids {
                behaviors.insert(*id, behavior.clone());
            }
        }
        self
    }

    /// Total `deliver` calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran to completion (success or scripted failure)
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Calls currently in progress
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in progress at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Nodes that received a message, with the message they received
    pub fn delivered(&self) -> Vec<(NodeId, NotificationMessage)> {
        self.delivered.lock().clone()
    }

    fn behavior_for(&self, node_id: NodeId) -> DeliveryBehavior {
        self.behaviors
            .lock()
            .get(&node_id)
            .cloned()
            .unwrap_or_else(|| self.default_behavior.clone())
    }
}

struct InFlightGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(in_flight: &'a AtomicUsize, max_in_flight: &AtomicUsize) -> Self {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryEffects for ScriptedDelivery {
    async fn deliver(
        &self,
        node: &NodeInfo,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard::enter(&self.in_flight, &self.max_in_flight);

        let result = match self.behavior_for(node.id) {
            DeliveryBehavior::Succeed => Ok(()),
            DeliveryBehavior::Fail(error) => Err(error),
            DeliveryBehavior::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            DeliveryBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            DeliveryBehavior::Panic => panic!("scripted delivery panic for node {}", node.id),
        };

        if result.is_ok() {
            self.delivered.lock().push((node.id, message.clone()));
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
