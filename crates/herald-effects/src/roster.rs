//! Roster-backed membership handler
//!
//! Stands in for the overlay service: a table of known nodes with a
//! reliability flag, kept behind a lock so operators and tests can change it
//! while broadcasts run.

use async_trait::async_trait;
use herald_core::{ConfigError, MembershipEffects, MembershipError, NetworkAddress, NodeId, NodeInfo};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_reliable() -> bool {
    true
}

/// One node entry of a roster file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identity
    pub id: NodeId,
    /// Address the node listens on
    pub address: NetworkAddress,
    /// Whether the node is eligible for broadcasts
    #[serde(default = "default_reliable")]
    pub reliable: bool,
}

impl NodeRecord {
    /// Reliable record for `id` at `address`
    pub fn reliable(id: NodeId, address: impl Into<NetworkAddress>) -> Self {
        Self {
            id,
            address: address.into(),
            reliable: true,
        }
    }
}

/// On-disk roster layout (`[[nodes]]` tables)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFile {
    /// Known nodes
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

/// Membership handler over an in-memory node roster
#[derive(Debug, Default)]
pub struct RosterMembershipHandler {
    entries: RwLock<BTreeMap<NodeId, NodeRecord>>,
    outage: RwLock<Option<String>>,
}

impl RosterMembershipHandler {
    /// Empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster holding `records`; a later record replaces an earlier one with the same id
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let handler = Self::new();
        {
            let mut entries = handler.entries.write();
            for record in records {
                entries.insert(record.id, record);
            }
        }
        handler
    }

    /// Load a roster from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let roster: RosterFile = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), nodes = roster.nodes.len(), "Loaded node roster");
        Ok(Self::from_records(roster.nodes))
    }

    /// Add or replace a node
    pub fn insert(&self, record: NodeRecord) {
        self.entries.write().insert(record.id, record);
    }

    /// Remove a node, returning its record
    pub fn remove(&self, id: NodeId) -> Option<NodeRecord> {
        self.entries.write().remove(&id)
    }

    /// Change a node's reliability; returns false if the node is unknown
    pub fn set_reliable(&self, id: NodeId, reliable: bool) -> bool {
        match self.entries.write().get_mut(&id) {
            Some(record) => {
                record.reliable = reliable;
                true
            }
            None => false,
        }
    }

    /// Simulate a membership store outage; listing fails until cleared
    pub fn mark_unavailable(&self, reason: impl Into<String>) {
        *self.outage.write() = Some(reason.into());
    }

    /// Clear a simulated outage
    pub fn mark_available(&self) {
        *self.outage.write() = None;
    }

    /// Number of known nodes, reliable or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the roster is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl MembershipEffects for RosterMembershipHandler {
    async fn list_reliable(&self) -> Result<Vec<NodeId>, MembershipError> {
        if let Some(reason) = self.outage.read().as_ref() {
            return Err(MembershipError::unavailable(reason.clone()));
        }
        Ok(self
            .entries
            .read()
            .values()
            .filter(|record| record.reliable)
            .map(|record| record.id)
            .collect())
    }

    async fn resolve(&self, node_id: NodeId) -> Result<NodeInfo, MembershipError> {
        self.entries
            .read()
            .get(&node_id)
            .map(|record| NodeInfo::new(record.id, record.address.clone()))
            .ok_or(MembershipError::NodeNotFound { node_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use herald_testkit::node_id;
    use std::io::Write;

    #[tokio::test]
    async fn listing_skips_unreliable_nodes() {
        let roster = RosterMembershipHandler::from_records([
            NodeRecord::reliable(node_id(0), "10.0.0.1:7777"),
            NodeRecord::reliable(node_id(1), "10.0.0.2:7777"),
        ]);
        roster.set_reliable(node_id(1), false);

        assert_eq!(roster.list_reliable().await.unwrap(), vec![node_id(0)]);
        assert!(roster.resolve(node_id(1)).await.is_ok());
    }

    #[tokio::test]
    async fn removed_node_no_longer_resolves() {
        let roster =
            RosterMembershipHandler::from_records([NodeRecord::reliable(node_id(0), "10.0.0.1:7777")]);
        roster.remove(node_id(0));

        assert_matches!(
            roster.resolve(node_id(0)).await,
            Err(MembershipError::NodeNotFound { .. })
        );
    }

    #[tokio::test]
    async fn outage_fails_listing_until_cleared() {
        let roster =
            RosterMembershipHandler::from_records([NodeRecord::reliable(node_id(0), "10.0.0.1:7777")]);
        roster.mark_unavailable("overlay cache cold");

        assert_matches!(
            roster.list_reliable().await,
            Err(MembershipError::Unavailable { .. })
        );
        roster.mark_available();
        assert_eq!(roster.list_reliable().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_records_collapse() {
        let roster = RosterMembershipHandler::from_records([
            NodeRecord::reliable(node_id(0), "10.0.0.1:7777"),
            NodeRecord::reliable(node_id(0), "10.0.0.9:7777"),
        ]);

        assert_eq!(roster.list_reliable().await.unwrap().len(), 1);
        assert_eq!(
            roster.resolve(node_id(0)).await.unwrap().address.as_str(),
            "10.0.0.9:7777"
        );
    }

    #[test]
    fn roster_file_defaults_reliable_to_true() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[nodes]]
id = "{}"
address = "127.0.0.1:7001"

[[nodes]]
id = "{}"
address = "127.0.0.1:7002"
reliable = false
"#,
            node_id(0),
            node_id(1)
        )
        .unwrap();

        let roster = RosterMembershipHandler::from_toml_file(file.path()).unwrap();
        assert_eq!(roster.len(), 2);
        let reliable = roster.entries.read().values().filter(|r| r.reliable).count();
        assert_eq!(reliable, 1);
    }
}
