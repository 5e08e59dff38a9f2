//! Membership effect trait

use crate::errors::MembershipError;
use crate::identifiers::{NodeId, NodeInfo};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the reliable node set and of node contact information
///
/// Any caching an implementation does is its own concern; callers treat every
/// `resolve` as a fresh lookup that may fail.
#[async_trait]
pub trait MembershipEffects: Send + Sync {
    /// List every node currently considered reliable.
    ///
    /// Fails with [`MembershipError::Unavailable`] when the store cannot be
    /// queried. The returned list never contains duplicates.
    async fn list_reliable(&self) -> Result<Vec<NodeId>, MembershipError>;

    /// Resolve an identity to contactable node info.
    ///
    /// Fails with [`MembershipError::NodeNotFound`] when the node disappeared
    /// after it was listed.
    async fn resolve(&self, node_id: NodeId) -> Result<NodeInfo, MembershipError>;
}

#[async_trait]
impl<T: MembershipEffects + ?Sized> MembershipEffects for Arc<T> {
    async fn list_reliable(&self) -> Result<Vec<NodeId>, MembershipError> {
        (**self).list_reliable().await
    }

    async fn resolve(&self, node_id: NodeId) -> Result<NodeInfo, MembershipError> {
        (**self).resolve(node_id).await
    }
}
