//! # Herald Testkit
//!
//! Scripted implementations of the membership and delivery effect traits,
//! instrumented so tests can assert on call counts and on how many deliveries
//! were in flight at once.
//!
//! ```rust,ignore
//! let membership = ScriptedMembership::with_nodes(10).unresolvable(&fixtures::node_ids(3));
//! let delivery = ScriptedDelivery::succeeding();
//! ```

pub mod delivery;
pub mod fixtures;
pub mod membership;

pub use delivery::{DeliveryBehavior, ScriptedDelivery};
pub use fixtures::{node_id, node_ids, wait_until};
pub use membership::ScriptedMembership;
