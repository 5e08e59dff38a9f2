//! Notification wire format.
//!
//! A frame is a 4-byte big-endian length followed by a JSON
//! [`NotificationEnvelope`]. The receiver answers every frame with a single
//! acknowledgment byte.

use herald_core::NotificationMessage;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Current notification envelope schema version
pub const NOTIFICATION_WIRE_SCHEMA_VERSION: u16 = 1;

/// Largest frame body accepted in either direction
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Acknowledgment byte for an accepted notification
pub const ACK_ACCEPTED: u8 = 0x01;

/// Acknowledgment byte for a refused notification
pub const ACK_REJECTED: u8 = 0x00;

/// Framing and encoding failures
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Transport failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Frame body over [`MAX_FRAME_LEN`]
    #[error("Frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge {
        /// Body length
        len: usize,
        /// Limit in force
        max: usize,
    },
    /// Body is not a valid envelope
    #[error("Malformed envelope: {0}")]
    Malformed(String),
    /// Envelope from a schema version this build does not speak
    #[error("Unsupported schema version {0}")]
    UnsupportedVersion(u16),
}

/// Notification as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    /// Schema version of the envelope
    pub schema_version: u16,
    /// Carried notification
    pub message: NotificationMessage,
}

impl NotificationEnvelope {
    /// Wrap a message in the current schema version.
    pub fn new(message: NotificationMessage) -> Self {
        Self {
            schema_version: NOTIFICATION_WIRE_SCHEMA_VERSION,
            message,
        }
    }
}

/// Encode an envelope as a complete frame, length prefix included
pub fn encode_envelope(envelope: &NotificationEnvelope) -> Result<Vec<u8>, WireError> {
    let body = serde_json::to_vec(envelope).map_err(|e| WireError::Malformed(e.to_string()))?;
    if body.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge {
            len: body.len(),
            max: MAX_FRAME_LEN,
        });
    }
    let len = u32::try_from(body.len()).map_err(|_| WireError::FrameTooLarge {
        len: body.len(),
        max: MAX_FRAME_LEN,
    })?;

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a frame body (without its length prefix)
pub fn decode_envelope(body: &[u8]) -> Result<NotificationEnvelope, WireError> {
    let envelope: NotificationEnvelope =
        serde_json::from_slice(body).map_err(|e| WireError::Malformed(e.to_string()))?;
    if envelope.schema_version != NOTIFICATION_WIRE_SCHEMA_VERSION {
        return Err(WireError::UnsupportedVersion(envelope.schema_version));
    }
    Ok(envelope)
}

/// Write a frame produced by [`encode_envelope`]
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame and decode its envelope
pub async fn read_frame<R>(reader: &mut R) -> Result<NotificationEnvelope, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    decode_envelope(&body)
}
