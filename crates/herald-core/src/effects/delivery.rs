//! Delivery effect trait

use crate::errors::DeliveryError;
use crate::identifiers::NodeInfo;
use crate::messages::NotificationMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// Client that carries one notification to one node
#[async_trait]
pub trait DeliveryEffects: Send + Sync {
    /// Attempt exactly one round trip to `node`.
    ///
    /// Any transport failure, deadline or remote rejection is an error. The
    /// wire format is owned by the implementation.
    async fn deliver(
        &self,
        node: &NodeInfo,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<T: DeliveryEffects + ?Sized> DeliveryEffects for Arc<T> {
    async fn deliver(
        &self,
        node: &NodeInfo,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        (**self).deliver(node, message).await
    }
}
