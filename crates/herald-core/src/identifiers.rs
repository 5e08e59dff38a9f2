//! Node identifiers and contact information
//!
//! A `NodeId` is issued by the membership service and never changes. A
//! `NodeInfo` pairs it with the address the node can currently be reached at;
//! it is resolved fresh for each broadcast and never cached by the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier for a storage node in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Network address for peer communication (`host:port`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkAddress {
    address: String,
}

impl NetworkAddress {
    /// Create a new network address
    pub fn new(address: String) -> Self {
        Self { address }
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl From<&str> for NetworkAddress {
    fn from(address: &str) -> Self {
        Self::new(address.to_string())
    }
}

impl From<String> for NetworkAddress {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

/// A node identity resolved to contactable information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Identity of the node
    pub id: NodeId,
    /// Address the node accepts notifications on
    pub address: NetworkAddress,
}

impl NodeInfo {
    /// Create node info from an identity and an address
    pub fn new(id: NodeId, address: impl Into<NetworkAddress>) -> Self {
        Self {
            id,
            address: address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_parses_its_display_form() {
        let id = NodeId::from_uuid(Uuid::from_u128(0xfeed));
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn network_address_serializes_as_plain_string() {
        let info = NodeInfo::new(NodeId::from_uuid(Uuid::from_u128(1)), "127.0.0.1:7777");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["address"], "127.0.0.1:7777");
    }
}
