//! Error types for membership, delivery, broadcast and configuration
//!
//! Only `BroadcastError` ever reaches the caller of a broadcast. Membership
//! resolution and delivery errors are folded into per-node outcomes by the
//! coordinator.

use crate::identifiers::NodeId;
use serde::{Deserialize, Serialize};

/// Failures reported by a membership service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum MembershipError {
    /// The membership store could not be queried at all
    #[error("Membership unavailable: {reason}")]
    Unavailable {
        /// Reason the store could not be queried
        reason: String,
    },
    /// The identity is no longer known to the membership service
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// Identity that failed to resolve
        node_id: NodeId,
    },
}

impl MembershipError {
    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Failures of a single delivery round trip
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum DeliveryError {
    /// Could not open a connection to the node
    #[error("Connection to {address} failed: {reason}")]
    ConnectionFailed {
        /// Address that was dialed
        address: String,
        /// Reason for the failure
        reason: String,
    },
    /// The connection was established but the exchange failed
    #[error("Send failed: {reason}")]
    SendFailed {
        /// Reason for the failure
        reason: String,
    },
    /// The node answered and refused the notification
    #[error("Notification rejected by {node_id}")]
    Rejected {
        /// Node that refused
        node_id: NodeId,
    },
    /// The round trip exceeded its deadline
    #[error("Delivery timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline in milliseconds
        timeout_ms: u64,
    },
    /// The message could not be encoded for the wire
    #[error("Serialization failed: {error}")]
    Serialization {
        /// Serialization error message
        error: String,
    },
}

impl DeliveryError {
    /// Create a send failure
    pub fn send_failed(reason: impl Into<String>) -> Self {
        Self::SendFailed {
            reason: reason.into(),
        }
    }
}

/// Invocation-level broadcast failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// The reliable node set could not be obtained; nothing was delivered
    #[error("Membership unavailable: {reason}")]
    MembershipUnavailable {
        /// Reason reported by the membership service
        reason: String,
    },
    /// The coordinator was built with an unusable configuration
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl From<MembershipError> for BroadcastError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Unavailable { reason } => Self::MembershipUnavailable { reason },
            other => Self::MembershipUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Configuration loading and validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {reason}")]
    Read {
        /// Path that was read
        path: String,
        /// I/O error message
        reason: String,
    },
    /// The configuration file is not valid TOML for the expected shape
    #[error("Invalid config file {path}: {reason}")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Parser error message
        reason: String,
    },
    /// An environment override could not be parsed
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Environment variable name
        key: String,
        /// Raw value found
        value: String,
    },
    /// A field holds a value the broadcast cannot run with
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
