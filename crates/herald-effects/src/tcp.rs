//! TCP delivery handler
//!
//! Each delivery encodes its frame, opens a fresh connection, writes the frame,
//! waits for the acknowledgment byte and closes. A message that cannot be
//! framed fails before any connection is made. No retries, no connection reuse.

use crate::wire::{self, NotificationEnvelope, ACK_ACCEPTED};
use async_trait::async_trait;
use herald_core::{DeliveryEffects, DeliveryError, NodeInfo, NotificationMessage};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// Delivers notifications over framed TCP
#[derive(Debug, Clone, Default)]
pub struct TcpDeliveryHandler {
    connect_timeout: Option<Duration>,
}

impl TcpDeliveryHandler {
    /// Handler bounded only by the caller's deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail connection attempts that take longer than `timeout`
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    async fn connect(&self, node: &NodeInfo) -> Result<TcpStream, DeliveryError> {
        let address = node.address.as_str();
        let connect = TcpStream::connect(address);
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| DeliveryError::Timeout {
                    timeout_ms: timeout.as_millis().try_into().unwrap_or(u64::MAX),
                })?,
            None => connect.await,
        };
        stream.map_err(|e| DeliveryError::ConnectionFailed {
            address: address.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DeliveryEffects for TcpDeliveryHandler {
    async fn deliver(
        &self,
        node: &NodeInfo,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        let frame = wire::encode_envelope(&NotificationEnvelope::new(message.clone())).map_err(|e| {
            DeliveryError::Serialization {
                error: e.to_string(),
            }
        })?;

        let mut stream = self.connect(node).await?;
        wire::write_frame(&mut stream, &frame)
            .await
            .map_err(|e| DeliveryError::send_failed(e.to_string()))?;

        let ack = stream
            .read_u8()
            .await
            .map_err(|e| DeliveryError::send_failed(format!("no acknowledgment: {e}")))?;
        if ack != ACK_ACCEPTED {
            return Err(DeliveryError::Rejected { node_id: node.id });
        }

        tracing::trace!(node = %node.id, address = %node.address, "Notification acknowledged");
        Ok(())
    }
}
