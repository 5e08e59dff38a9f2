//! Notification payloads
//!
//! The inbound request carries raw bytes; the delivered message is their text
//! form. A `NotificationMessage` is immutable once built and is shared
//! read-only by every delivery attempt of a broadcast.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text the operator wants delivered to every reliable node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationMessage {
    text: String,
}

impl NotificationMessage {
    /// Create a message from text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build a message from raw request bytes, replacing invalid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Message text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Message length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the message is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for NotificationMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for NotificationMessage {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Inbound notification request
///
/// Carries no addressee list: notifications always go to every node the
/// membership service currently considers reliable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Raw message payload
    pub message: Vec<u8>,
}

impl NotificationRequest {
    /// Create a request from any byte payload
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Convert the payload to the message delivered to nodes
    pub fn to_message(&self) -> NotificationMessage {
        NotificationMessage::from_bytes(&self.message)
    }
}

/// Empty acknowledgment returned once a broadcast has run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResponse {}
