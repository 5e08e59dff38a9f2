//! Scripted membership service

use crate::fixtures::{node_address, node_id};
use async_trait::async_trait;
use herald_core::{MembershipEffects, MembershipError, NodeId, NodeInfo};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Membership fake with a fixed listing and injectable failures
#[derive(Debug, Default)]
pub struct ScriptedMembership {
    listed: RwLock<Vec<NodeId>>,
    contacts: RwLock<BTreeMap<NodeId, NodeInfo>>,
    unresolvable: RwLock<BTreeSet<NodeId>>,
    listing_fails: AtomicBool,
    list_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl ScriptedMembership {
    /// Membership listing `count` reliable nodes, all resolvable
    pub fn with_nodes(count: usize) -> Self {
        let membership = Self::default();
        for index in 0..count {
            membership.add_node(NodeInfo {
                id: node_id(index),
                address: node_address(index),
            });
        }
        membership
    }

    /// Membership whose listing always fails
    pub fn unavailable() -> Self {
        let membership = Self::default();
        membership.listing_fails.store(true, Ordering::SeqCst);
        membership
    }

    /// Keep `ids` in the listing but make them fail to resolve
    pub fn unresolvable(self, ids: &[NodeId]) -> Self {
        self.unresolvable.write().extend(ids.iter().copied());
        self
    }

    /// Add a reliable, resolvable node
    pub fn add_node(&self, info: NodeInfo) {
        self.listed.write().push(info.id);
        self.contacts.write().insert(info.id, info);
    }

    /// Make `id` fail resolution from now on, as if it left the network
    pub fn forget(&self, id: NodeId) {
        self.unresolvable.write().insert(id);
    }

    /// Toggle listing failure
    pub fn set_listing_fails(&self, fails: bool) {
        self.listing_fails.store(fails, Ordering::SeqCst);
    }

    /// Number of `list_reliable` calls so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `resolve` calls so far
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipEffects for ScriptedMembership {
    async fn list_reliable(&self) -> Result<Vec<NodeId>, MembershipError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(MembershipError::unavailable("scripted listing failure"));
        }
        Ok(self.listed.read().clone())
    }

    async fn resolve(&self, node_id: NodeId) -> Result<NodeInfo, MembershipError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.unresolvable.read().contains(&node_id) {
            return Err(MembershipError::NodeNotFound { node_id });
        }
        self.contacts
            .read()
            .get(&node_id)
            .cloned()
            .ok_or(MembershipError::NodeNotFound { node_id })
    }
}
