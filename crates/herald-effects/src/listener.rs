//! Receiving side of the notification wire format
//!
//! Accepts connections, decodes one frame per connection, forwards the message
//! on a channel and acknowledges. A frame is refused when it cannot be decoded
//! or nobody is consuming notifications any more. A peer that does not deliver
//! a full frame within the read timeout is disconnected without an ack.

use crate::wire::{self, WireError, ACK_ACCEPTED, ACK_REJECTED};
use herald_core::NotificationMessage;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A notification accepted by the listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedNotification {
    /// Remote address of the sender
    pub peer: SocketAddr,
    /// Delivered message
    pub message: NotificationMessage,
}

/// Default time a connection gets to deliver its frame
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP listener for incoming notifications
#[derive(Debug)]
pub struct NotificationListener {
    listener: TcpListener,
    sink: mpsc::Sender<ReceivedNotification>,
    read_timeout: Duration,
}

impl NotificationListener {
    /// Bind to `addr`, forwarding accepted notifications to `sink`
    pub async fn bind(
        addr: impl ToSocketAddrs,
        sink: mpsc::Sender<ReceivedNotification>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            sink,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Drop connections that take longer than `timeout` to send their frame
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until `cancel` fires. Open connections are aborted on shutdown.
    pub async fn run(self, cancel: CancellationToken) -> io::Result<()> {
        let mut connections = JoinSet::new();
        tracing::info!(address = ?self.listener.local_addr().ok(), "Listening for notifications");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let sink = self.sink.clone();
                            let read_timeout = self.read_timeout;
                            connections.spawn(handle_connection(stream, peer, sink, read_timeout));
                        }
                        Err(e) => tracing::warn!(error = %e, "Failed to accept connection"),
                    }
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        connections.shutdown().await;
        tracing::info!("Notification listener stopped");
        Ok(())
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    sink: mpsc::Sender<ReceivedNotification>,
    read_timeout: Duration,
) {
    let Ok(frame) = tokio::time::timeout(read_timeout, wire::read_frame(&mut stream)).await else {
        tracing::debug!(
            %peer,
            timeout_ms = read_timeout.as_millis(),
            "No frame before read timeout; disconnecting"
        );
        return;
    };

    let ack = match frame {
        Ok(envelope) => {
            let notification = ReceivedNotification {
                peer,
                message: envelope.message,
            };
            if sink.send(notification).await.is_ok() {
                ACK_ACCEPTED
            } else {
                tracing::warn!(%peer, "Notification consumer gone; refusing");
                ACK_REJECTED
            }
        }
        Err(WireError::Io(e)) => {
            tracing::debug!(%peer, error = %e, "Connection closed before a full frame");
            return;
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "Refusing malformed notification");
            ACK_REJECTED
        }
    };

    if let Err(e) = stream.write_u8(ack).await {
        tracing::debug!(%peer, error = %e, "Failed to send acknowledgment");
    }
}
