//! Operations submitted together in one store transaction

use graphlink_core::{Node, NodeId, Properties, Relationship, RelationshipSpec};

use crate::error::{Result, StorageError};

/// A single write in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOperation {
    /// Create a node with the given properties
    CreateNode { properties: Properties },

    /// Unconditionally create a relationship between two existing nodes
    CreateRelationship {
        start: NodeId,
        rel_type: String,
        end: NodeId,
        properties: Properties,
    },

    /// Return the single relationship matching the specification, creating it if none exists
    ///
    /// Fails the whole batch with [`StorageError::Ambiguous`] when more than one
    /// relationship matches.
    GetOrCreateRelationship(RelationshipSpec),

    /// Replace every property of an existing node
    SetNodeProperties { node: NodeId, properties: Properties },

    /// Delete every relationship starting at an existing node
    DeleteOutgoingRelationships { node: NodeId },
}

impl BatchOperation {
    pub fn create_node(properties: Properties) -> Self {
        Self::CreateNode { properties }
    }

    pub fn create_relationship(
        start: NodeId,
        rel_type: impl Into<String>,
        end: NodeId,
        properties: Properties,
    ) -> Self {
        Self::CreateRelationship {
            start,
            rel_type: rel_type.into(),
            end,
            properties,
        }
    }

    pub fn set_node_properties(node: NodeId, properties: Properties) -> Self {
        Self::SetNodeProperties { node, properties }
    }

    pub fn delete_outgoing_relationships(node: NodeId) -> Self {
        Self::DeleteOutgoingRelationships { node }
    }

    /// Reject operations no store could execute
    pub(crate) fn check(&self, index: usize) -> Result<()> {
        let (rel_type, both_wildcard) = match self {
            Self::CreateNode { .. }
            | Self::SetNodeProperties { .. }
            | Self::DeleteOutgoingRelationships { .. } => return Ok(()),
            Self::CreateRelationship { rel_type, .. } => (rel_type, false),
            Self::GetOrCreateRelationship(spec) => (&spec.rel_type, spec.is_fully_wildcard()),
        };
        if rel_type.is_empty() {
            return Err(StorageError::InvalidOperation {
                index,
                reason: "relationship type must not be empty".to_string(),
            });
        }
        if both_wildcard {
            return Err(StorageError::InvalidOperation {
                index,
                reason: "start and end must not both be wildcards".to_string(),
            });
        }
        Ok(())
    }
}

/// Result of one batch operation, at the same position as the operation
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Node(Node),
    Relationship(Relationship),
    /// Number of relationships deleted
    Deleted(usize),
}

impl BatchOutcome {
    pub fn into_node(self) -> Option<Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_relationship(self) -> Option<Relationship> {
        match self {
            Self::Relationship(rel) => Some(rel),
            _ => None,
        }
    }
}

/// Check every operation of a batch and the batch size limit
pub(crate) fn check_batch(operations: &[BatchOperation], max: Option<usize>) -> Result<()> {
    if let Some(max) = max {
        if operations.len() > max {
            return Err(StorageError::BatchSizeExceeded {
                requested: operations.len(),
                max,
            });
        }
    }
    operations
        .iter()
        .enumerate()
        .try_for_each(|(index, op)| op.check(index))
}
