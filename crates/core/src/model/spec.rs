//! Caller-side descriptions of relationships: specifications and match patterns

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::graph::{Node, NodeId, Relationship};
use super::properties::Properties;
use crate::cypher::cypher_map;

/// One end of a relationship specification
///
/// `Wildcard` matches any node when looking up an existing relationship and
/// stands for a freshly created node when a new relationship has to be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Node(NodeId),
    Wildcard,
}

impl Endpoint {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Wildcard => None,
        }
    }
}

impl From<NodeId> for Endpoint {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&Node> for Endpoint {
    fn from(node: &Node) -> Self {
        Self::Node(node.id)
    }
}

impl From<Option<NodeId>> for Endpoint {
    fn from(id: Option<NodeId>) -> Self {
        id.map_or(Self::Wildcard, Self::Node)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "({})", id.0),
            Self::Wildcard => f.write_str("()"),
        }
    }
}

/// Description of a relationship to get or create
///
/// `properties: None` matches an existing relationship regardless of its
/// properties. `Some(map)` only matches a relationship whose properties equal
/// `map` exactly, so `Some(Properties::new())` matches only property-less edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct RelationshipSpec {
    pub start: Endpoint,
    pub rel_type: String,
    pub end: Endpoint,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl RelationshipSpec {
    pub fn new(
        start: impl Into<Endpoint>,
        rel_type: impl Into<String>,
        end: impl Into<Endpoint>,
    ) -> Self {
        Self {
            start: start.into(),
            rel_type: rel_type.into(),
            end: end.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn is_fully_wildcard(&self) -> bool {
        self.start.is_wildcard() && self.end.is_wildcard()
    }

    /// Properties to write when the relationship has to be created
    pub fn creation_properties(&self) -> Properties {
        self.properties.clone().unwrap_or_default()
    }

    /// Pattern that finds relationships this specification would accept
    pub fn pattern(&self) -> RelationshipPattern {
        RelationshipPattern {
            start: self.start.node_id(),
            rel_type: Some(self.rel_type.clone()),
            end: self.end.node_id(),
            properties: self.properties.clone(),
        }
    }
}

impl fmt::Display for RelationshipSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[:{}", self.start, self.rel_type)?;
        if let Some(map) = self.properties.as_ref().and_then(|p| cypher_map(p).ok()) {
            write!(f, " {map}")?;
        }
        write!(f, "]->{}", self.end)
    }
}

/// Structural match criteria for relationships; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipPattern {
    pub start: Option<NodeId>,
    pub rel_type: Option<String>,
    pub end: Option<NodeId>,
    pub properties: Option<Properties>,
}

impl RelationshipPattern {
    pub fn matches(&self, rel: &Relationship) -> bool {
        self.start.is_none_or(|id| id == rel.start)
            && self.end.is_none_or(|id| id == rel.end)
            && self
                .rel_type
                .as_deref()
                .is_none_or(|t| t == rel.rel_type)
            && self
                .properties
                .as_ref()
                .is_none_or(|p| *p == rel.properties)
    }
}
