use async_trait::async_trait;
use graphlink_core::{
    Node, NodeId, Relationship, RelationshipId, RelationshipPattern, StoreConfig,
};
use tracing::{debug, warn};

use super::client::Neo4jClient;
use super::response::{parse_count, parse_node, parse_relationship, restore_nulls, StatementResult};
use super::statements;
use crate::batch::{check_batch, BatchOperation, BatchOutcome};
use crate::error::{Result, StorageError};
use crate::traits::GraphStore;

/// [`GraphStore`] backed by a Neo4j server over HTTP
///
/// Each batch runs in one server-side transaction. The transaction is only
/// committed after every operation produced exactly the rows it should, so
/// ambiguous matches and missing nodes roll the whole batch back.
///
/// Neo4j cannot store null properties. Null-valued keys are dropped on write
/// and only re-attached to the node or relationship returned by the write
/// itself. Later reads such as [`GraphStore::relationship`] or
/// [`GraphStore::find_relationships`] report those keys as absent, where
/// [`MockGraphStore`](crate::MockGraphStore) reports them as present with
/// [`PropertyValue::Null`](graphlink_core::PropertyValue::Null). Matching
/// treats `{a: 1, b: null}` and `{a: 1}` as the same properties.
pub struct Neo4jGraphStore {
    client: Neo4jClient,
    max_batch_size: usize,
}

impl Neo4jGraphStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            client: Neo4jClient::new(config)?,
            max_batch_size: config.max_batch_size,
        })
    }

    async fn run_single(&self, statement: statements::Statement) -> Result<StatementResult> {
        self.client
            .run(std::slice::from_ref(&statement))
            .await?
            .pop()
            .ok_or_else(|| StorageError::Protocol("missing statement result".to_string()))
    }
}

fn decode_outcome(
    operation: &BatchOperation,
    index: usize,
    result: &StatementResult,
) -> Result<BatchOutcome> {
    let rows = &result.data;
    match operation {
        BatchOperation::CreateNode { properties } => {
            let row = rows.first().ok_or_else(|| {
                StorageError::Protocol(format!("operation {index} created no node"))
            })?;
            let mut node = parse_node(&row.row)?;
            restore_nulls(&mut node.properties, properties);
            Ok(BatchOutcome::Node(node))
        }
        BatchOperation::CreateRelationship { properties, .. } => {
            let row = rows.first().ok_or(StorageError::MissingNode { index })?;
            let mut rel = parse_relationship(&row.row)?;
            restore_nulls(&mut rel.properties, properties);
            Ok(BatchOutcome::Relationship(rel))
        }
        BatchOperation::GetOrCreateRelationship(spec) => match rows.as_slice() {
            [] => Err(StorageError::MissingNode { index }),
            [row] => {
                let mut rel = parse_relationship(&row.row)?;
                if let Some(properties) = &spec.properties {
                    restore_nulls(&mut rel.properties, properties);
                }
                Ok(BatchOutcome::Relationship(rel))
            }
            matches => Err(StorageError::Ambiguous {
                index,
                matches: matches.len(),
            }),
        },
        BatchOperation::SetNodeProperties { properties, .. } => {
            let row = rows.first().ok_or(StorageError::MissingNode { index })?;
            let mut node = parse_node(&row.row)?;
            restore_nulls(&mut node.properties, properties);
            Ok(BatchOutcome::Node(node))
        }
        BatchOperation::DeleteOutgoingRelationships { .. } => {
            let row = rows.first().ok_or(StorageError::MissingNode { index })?;
            Ok(BatchOutcome::Deleted(parse_count(&row.row)?))
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn node(&self, id: NodeId) -> Result<Option<Node>> {
        let result = self.run_single(statements::node_by_id(id)).await?;
        result
            .data
            .first()
            .map(|row| parse_node(&row.row))
            .transpose()
    }

    async fn relationship(&self, id: RelationshipId) -> Result<Option<Relationship>> {
        let result = self.run_single(statements::relationship_by_id(id)).await?;
        result
            .data
            .first()
            .map(|row| parse_relationship(&row.row))
            .transpose()
    }

    async fn find_relationships(&self, pattern: &RelationshipPattern) -> Result<Vec<Relationship>> {
        let result = self
            .run_single(statements::find_relationships(pattern)?)
            .await?;
        result
            .data
            .iter()
            .map(|row| parse_relationship(&row.row))
            .collect()
    }

    async fn execute_batch(&self, operations: &[BatchOperation]) -> Result<Vec<BatchOutcome>> {
        check_batch(operations, Some(self.max_batch_size))?;
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        let statements = operations
            .iter()
            .enumerate()
            .map(|(index, op)| statements::for_operation(op, index))
            .collect::<Result<Vec<_>>>()?;

        let transaction = self.client.open(&statements).await?;
        let outcomes = operations
            .iter()
            .zip(&transaction.results)
            .enumerate()
            .map(|(index, (op, result))| decode_outcome(op, index, result))
            .collect::<Result<Vec<_>>>();

        match outcomes {
            Ok(outcomes) => {
                self.client.commit(&transaction).await?;
                debug!(operations = operations.len(), "Committed batch");
                Ok(outcomes)
            }
            Err(e) => {
                if let Err(rollback_err) = self.client.rollback(&transaction).await {
                    warn!("Failed to roll back batch after {e}: {rollback_err}");
                }
                Err(e)
            }
        }
    }
}
