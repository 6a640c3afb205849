use async_trait::async_trait;
use graphlink_core::{
    Direction, Node, NodeId, Properties, Relationship, RelationshipId, RelationshipPattern,
};

use crate::batch::{BatchOperation, BatchOutcome};
use crate::error::{Result, StorageError};

/// Capability offered by a graph store
///
/// Every method is one round trip to the store. [`GraphStore::execute_batch`]
/// is the only way to group several writes, and it is atomic: either every
/// operation is applied and an outcome is returned for each, or none is.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ===== Node Operations =====

    /// Fetch a node by id
    async fn node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Create one node per property map, in order
    async fn create_nodes(&self, properties: &[Properties]) -> Result<Vec<Node>> {
        let operations: Vec<BatchOperation> = properties
            .iter()
            .cloned()
            .map(BatchOperation::create_node)
            .collect();
        self.execute_batch(&operations)
            .await?
            .into_iter()
            .map(|outcome| {
                outcome
                    .into_node()
                    .ok_or_else(|| StorageError::Protocol("expected a node outcome".to_string()))
            })
            .collect()
    }

    // ===== Relationship Operations =====

    /// Fetch a relationship by id
    async fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>>;

    /// Unconditionally create a relationship between two existing nodes
    async fn create_relationship(
        &self,
        start: NodeId,
        rel_type: &str,
        end: NodeId,
        properties: &Properties,
    ) -> Result<Relationship> {
        let operation =
            BatchOperation::create_relationship(start, rel_type, end, properties.clone());
        self.execute_batch(std::slice::from_ref(&operation))
            .await?
            .into_iter()
            .next()
            .and_then(BatchOutcome::into_relationship)
            .ok_or_else(|| StorageError::Protocol("expected a relationship outcome".to_string()))
    }

    /// All relationships matching the pattern
    ///
    /// `properties: None` ignores relationship properties; `Some(map)` requires
    /// exact equality with `map`.
    async fn find_relationships(&self, pattern: &RelationshipPattern) -> Result<Vec<Relationship>>;

    /// Relationships attached to `node` in the given direction, optionally of one type
    async fn node_relationships(
        &self,
        node: NodeId,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let rel_type = rel_type.map(str::to_string);
        let outgoing = RelationshipPattern {
            start: Some(node),
            rel_type: rel_type.clone(),
            ..Default::default()
        };
        let incoming = RelationshipPattern {
            end: Some(node),
            rel_type,
            ..Default::default()
        };
        match direction {
            Direction::Outgoing => self.find_relationships(&outgoing).await,
            Direction::Incoming => self.find_relationships(&incoming).await,
            Direction::Both => {
                let mut rels = self.find_relationships(&outgoing).await?;
                // self-loops come back from both queries
                for rel in self.find_relationships(&incoming).await? {
                    if !rels.iter().any(|r| r.id == rel.id) {
                        rels.push(rel);
                    }
                }
                Ok(rels)
            }
        }
    }

    // ===== Batches =====

    /// Apply all operations in one transaction, returning one outcome per operation
    async fn execute_batch(&self, operations: &[BatchOperation]) -> Result<Vec<BatchOutcome>>;
}
