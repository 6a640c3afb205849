//! Store-owned graph elements: nodes and relationships

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

use super::properties::{Properties, PropertyValue};

/// Store-assigned identifier of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node/{}", self.0)
    }
}

/// Store-assigned identifier of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub i64);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relationship/{}", self.0)
    }
}

/// A graph vertex as confirmed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// A typed, directed edge as confirmed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub start: NodeId,
    pub rel_type: String,
    pub end: NodeId,
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Whether both references denote the same underlying edge
    pub fn same_edge(&self, other: &Relationship) -> bool {
        self.id == other.id
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Whether the key is present, including keys mapped to `Null`
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint
    pub fn other_node(&self, node: NodeId) -> Option<NodeId> {
        if self.start == node {
            Some(self.end)
        } else if self.end == node {
            Some(self.start)
        } else {
            None
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})-[{}:{}]->({})",
            self.start.0, self.id.0, self.rel_type, self.end.0
        )
    }
}

/// Direction of relationships relative to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl Direction {
    /// Whether `rel` runs in this direction relative to `node`
    pub fn admits(&self, rel: &Relationship, node: NodeId) -> bool {
        match self {
            Self::Outgoing => rel.start == node,
            Self::Incoming => rel.end == node,
            Self::Both => rel.start == node || rel.end == node,
        }
    }
}
