//! In-memory graph store for testing
//!
//! Batches are applied to a staged copy of the graph and only committed when
//! every operation succeeds, so a failing batch leaves no trace. Faults can be
//! injected to simulate an unreachable store.

use async_trait::async_trait;
use graphlink_core::{
    Direction, Endpoint, Node, NodeId, Properties, Relationship, RelationshipId, RelationshipPattern,
    RelationshipSpec,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::batch::{check_batch, BatchOperation, BatchOutcome};
use crate::error::{Result, StorageError};
use crate::traits::GraphStore;

#[derive(Debug, Clone, Default)]
struct MockData {
    nodes: BTreeMap<NodeId, Node>,
    relationships: BTreeMap<RelationshipId, Relationship>,
    node_id_counter: i64,
    relationship_id_counter: i64,
}

impl MockData {
    fn add_node(&mut self, properties: Properties) -> Node {
        let node = Node {
            id: NodeId(self.node_id_counter),
            properties,
        };
        self.node_id_counter += 1;
        self.nodes.insert(node.id, node.clone());
        node
    }

    fn add_relationship(
        &mut self,
        start: NodeId,
        rel_type: &str,
        end: NodeId,
        properties: Properties,
    ) -> Relationship {
        let rel = Relationship {
            id: RelationshipId(self.relationship_id_counter),
            start,
            rel_type: rel_type.to_string(),
            end,
            properties,
        };
        self.relationship_id_counter += 1;
        self.relationships.insert(rel.id, rel.clone());
        rel
    }

    fn require_node(&self, id: NodeId, index: usize) -> Result<NodeId> {
        if self.nodes.contains_key(&id) {
            Ok(id)
        } else {
            Err(StorageError::MissingNode { index })
        }
    }

    fn resolve_endpoint(&mut self, endpoint: Endpoint, index: usize) -> Result<NodeId> {
        match endpoint {
            Endpoint::Node(id) => self.require_node(id, index),
            Endpoint::Wildcard => Ok(self.add_node(Properties::new()).id),
        }
    }

    fn find(&self, pattern: &RelationshipPattern) -> Vec<Relationship> {
        self.relationships
            .values()
            .filter(|rel| pattern.matches(rel))
            .cloned()
            .collect()
    }

    fn get_or_create(&mut self, spec: &RelationshipSpec, index: usize) -> Result<Relationship> {
        for endpoint in [spec.start, spec.end] {
            if let Endpoint::Node(id) = endpoint {
                self.require_node(id, index)?;
            }
        }

        let mut found = self.find(&spec.pattern());
        match found.len() {
            0 => {
                let start = self.resolve_endpoint(spec.start, index)?;
                let end = self.resolve_endpoint(spec.end, index)?;
                Ok(self.add_relationship(start, &spec.rel_type, end, spec.creation_properties()))
            }
            1 => Ok(found.remove(0)),
            matches => Err(StorageError::Ambiguous { index, matches }),
        }
    }

    fn apply(&mut self, operation: &BatchOperation, index: usize) -> Result<BatchOutcome> {
        match operation {
            BatchOperation::CreateNode { properties } => {
                Ok(BatchOutcome::Node(self.add_node(properties.clone())))
            }
            BatchOperation::CreateRelationship {
                start,
                rel_type,
                end,
                properties,
            } => {
                let start = self.require_node(*start, index)?;
                let end = self.require_node(*end, index)?;
                Ok(BatchOutcome::Relationship(self.add_relationship(
                    start,
                    rel_type,
                    end,
                    properties.clone(),
                )))
            }
            BatchOperation::GetOrCreateRelationship(spec) => {
                self.get_or_create(spec, index).map(BatchOutcome::Relationship)
            }
            BatchOperation::SetNodeProperties { node, properties } => {
                let stored = self
                    .nodes
                    .get_mut(node)
                    .ok_or(StorageError::MissingNode { index })?;
                stored.properties = properties.clone();
                Ok(BatchOutcome::Node(stored.clone()))
            }
            BatchOperation::DeleteOutgoingRelationships { node } => {
                self.require_node(*node, index)?;
                let before = self.relationships.len();
                self.relationships.retain(|_, rel| rel.start != *node);
                Ok(BatchOutcome::Deleted(before - self.relationships.len()))
            }
        }
    }
}

/// Fault injection settings
#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    /// Fail the next batch when it reaches this operation index
    fail_batch_at: Option<usize>,
}

/// Mock graph store for testing
#[derive(Clone, Default)]
pub struct MockGraphStore {
    data: Arc<Mutex<MockData>>,
    faults: Arc<Mutex<Faults>>,
    round_trips: Arc<AtomicUsize>,
}

impl MockGraphStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count a round trip and fail it if the store is marked unavailable
    fn round_trip(&self) -> Result<()> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if self.faults().unavailable {
            return Err(StorageError::Unavailable(
                "mock store is unreachable".to_string(),
            ));
        }
        Ok(())
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults().unavailable = unavailable;
    }

    /// Drop the connection while the next batch is applying operation `index`
    pub fn fail_next_batch_at(&self, index: usize) {
        self.faults().fail_batch_at = Some(index);
    }

    /// Get number of nodes stored
    pub fn node_count(&self) -> usize {
        self.data().nodes.len()
    }

    /// Get number of relationships stored
    pub fn relationship_count(&self) -> usize {
        self.data().relationships.len()
    }

    /// Number of calls made against this store
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn node(&self, id: NodeId) -> Result<Option<Node>> {
        self.round_trip()?;
        Ok(self.data().nodes.get(&id).cloned())
    }

    async fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>> {
        self.round_trip()?;
        Ok(self.data().relationships.get(&id).cloned())
    }

    async fn find_relationships(&self, pattern: &RelationshipPattern) -> Result<Vec<Relationship>> {
        self.round_trip()?;
        Ok(self.data().find(pattern))
    }

    async fn node_relationships(
        &self,
        node: NodeId,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        self.round_trip()?;
        Ok(self
            .data()
            .relationships
            .values()
            .filter(|rel| direction.admits(rel, node))
            .filter(|rel| rel_type.is_none_or(|t| t == rel.rel_type))
            .cloned()
            .collect())
    }

    async fn execute_batch(&self, operations: &[BatchOperation]) -> Result<Vec<BatchOutcome>> {
        check_batch(operations, None)?;
        self.round_trip()?;

        let fail_at = self.faults().fail_batch_at.take();
        let mut data = self.data();
        let mut staged = data.clone();
        let mut outcomes = Vec::with_capacity(operations.len());

        for (index, operation) in operations.iter().enumerate() {
            if fail_at == Some(index) {
                debug!(index, "Mock store dropping connection mid-batch");
                return Err(StorageError::Unavailable(format!(
                    "connection lost at operation {index}"
                )));
            }
            outcomes.push(staged.apply(operation, index)?);
        }

        *data = staged;
        debug!(operations = operations.len(), "Mock store committed batch");
        Ok(outcomes)
    }
}
