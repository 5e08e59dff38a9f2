//! # Herald Broadcast
//!
//! Delivers one operator notification to every reliable node:
//! - [`BroadcastCoordinator`] fans the message out through a fixed-size worker
//!   pool, applying a per-node deadline and honoring cancellation
//! - [`BroadcastResult`] aggregates exactly one [`DeliveryOutcome`] per node
//! - [`NotificationEndpoint`] is the request-facing wrapper that lists the
//!   reliable set, runs the broadcast and acknowledges the caller
//!
//! Delivery is best-effort. Failed nodes are recorded, never retried, and only
//! an unavailable membership service fails a broadcast as a whole.

#![forbid(unsafe_code)]

pub mod coordinator;
pub mod endpoint;
pub mod outcome;

pub use coordinator::BroadcastCoordinator;
pub use endpoint::NotificationEndpoint;
pub use outcome::{
    BroadcastResult, BroadcastStatus, DeliveryFailure, DeliveryOutcome, FailureBreakdown,
    NodeFailure,
};

/// Cancellation handle accepted by broadcast entry points
pub use tokio_util::sync::CancellationToken;
