//! Client-side view of a graph held in a store

use graphlink_core::{
    Direction, Node, NodeId, Properties, Relationship, RelationshipId, RelationshipPattern,
    RelationshipSpec, StoreConfig,
};
use graphlink_storage::{create_graph_store, GraphStore};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::reconciler::RelationshipReconciler;

/// Node and relationship operations over a [`GraphStore`]
#[derive(Clone)]
pub struct Graph {
    store: Arc<dyn GraphStore>,
    reconciler: RelationshipReconciler,
}

impl Graph {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            reconciler: RelationshipReconciler::new(Arc::clone(&store)),
            store,
        }
    }

    /// Build the store named by `config` and wrap it
    pub fn connect(config: &StoreConfig) -> graphlink_core::Result<Self> {
        Ok(Self::new(create_graph_store(config)?))
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn reconciler(&self) -> &RelationshipReconciler {
        &self.reconciler
    }

    /// Create one node per property map in a single batch, in order
    pub async fn create_nodes(&self, properties: &[Properties]) -> Result<Vec<Node>> {
        debug!(count = properties.len(), "Creating nodes");
        Ok(self.store.create_nodes(properties).await?)
    }

    pub async fn node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.store.node(id).await?)
    }

    /// Create `node -[rel_type]-> other`
    pub async fn create_relationship_to(
        &self,
        node: NodeId,
        rel_type: &str,
        other: NodeId,
        properties: &Properties,
    ) -> Result<Relationship> {
        self.create_relationship(node, rel_type, other, properties).await
    }

    /// Create `other -[rel_type]-> node`
    pub async fn create_relationship_from(
        &self,
        node: NodeId,
        rel_type: &str,
        other: NodeId,
        properties: &Properties,
    ) -> Result<Relationship> {
        self.create_relationship(other, rel_type, node, properties).await
    }

    async fn create_relationship(
        &self,
        start: NodeId,
        rel_type: &str,
        end: NodeId,
        properties: &Properties,
    ) -> Result<Relationship> {
        if rel_type.is_empty() {
            return Err(ReconcileError::InvalidSpecification {
                index: 0,
                reason: "relationship type must not be empty".to_string(),
            });
        }
        Ok(self
            .store
            .create_relationship(start, rel_type, end, properties)
            .await?)
    }

    /// Relationships attached to `node`, optionally restricted to one type
    pub async fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        Ok(self
            .store
            .node_relationships(node, direction, rel_type)
            .await?)
    }

    pub async fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>> {
        Ok(self.store.relationship(id).await?)
    }

    pub async fn find_relationships(
        &self,
        pattern: &RelationshipPattern,
    ) -> Result<Vec<Relationship>> {
        Ok(self.store.find_relationships(pattern).await?)
    }

    /// See [`RelationshipReconciler::reconcile`]
    pub async fn get_or_create_relationships(
        &self,
        specs: &[RelationshipSpec],
    ) -> Result<Vec<Relationship>> {
        self.reconciler.reconcile(specs).await
    }
}
