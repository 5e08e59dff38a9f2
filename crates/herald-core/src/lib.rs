//! # Herald Core - Foundation Types and Effect Interfaces
//!
//! Shared vocabulary for every Herald crate:
//! - Node identifiers and contact information
//! - Notification request, response and message types
//! - The error taxonomy for membership, delivery and broadcast failures
//! - Effect traits for the two collaborators the broadcast core depends on
//! - Operator configuration for the broadcast fan-out
//!
//! This crate contains no runtime behavior. Handlers for the effect traits live
//! in `herald-effects` (production) and `herald-testkit` (fakes).

#![forbid(unsafe_code)]

/// Operator-facing broadcast configuration
pub mod config;

/// Effect traits for membership and delivery collaborators
pub mod effects;

/// Error types shared across crates
pub mod errors;

/// Node identifiers and contact info
pub mod identifiers;

/// Notification payloads and request/response envelopes
pub mod messages;

pub use config::BroadcastConfig;
pub use effects::{DeliveryEffects, MembershipEffects};
pub use errors::{BroadcastError, ConfigError, DeliveryError, MembershipError};
pub use identifiers::{NetworkAddress, NodeId, NodeInfo};
pub use messages::{NotificationMessage, NotificationRequest, NotificationResponse};
