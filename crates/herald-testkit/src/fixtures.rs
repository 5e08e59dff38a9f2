//! Deterministic identities and polling helpers

use herald_core::{NetworkAddress, NodeId};
use std::time::Duration;
use uuid::Uuid;

/// Deterministic node identity for index `index` (1-based UUIDs)
pub fn node_id(index: usize) -> NodeId {
    NodeId::from_uuid(Uuid::from_u128(index as u128 + 1))
}

/// The first `count` deterministic node identities
pub fn node_ids(count: usize) -> Vec<NodeId> {
    (0..count).map(node_id).collect()
}

/// Synthetic address for the node at `index`
pub fn node_address(index: usize) -> NetworkAddress {
    NetworkAddress::new(format!("10.0.{}.{}:7777", index / 256, index % 256))
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
///
/// Returns whether the condition was observed.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
