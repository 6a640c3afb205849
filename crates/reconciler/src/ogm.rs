//! Object to graph mapping
//!
//! A [`Mapped`] value owns one node and all of that node's outgoing
//! relationships. Relationships are edited locally with [`Mapped::relate`]
//! and [`Mapped::separate`]; nothing reaches the store until
//! [`ObjectStore::save`] writes the node and its relationships in one batch.
//!
//! Properties are copied field by field through `serde`. Keys starting with
//! `_` are skipped in both directions.

use graphlink_core::{Direction, NodeId, Properties, PropertyValue};
use graphlink_storage::BatchOperation;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::graph::Graph;

/// One outgoing relationship held by a [`Mapped`] value
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub properties: Properties,
    pub end: NodeId,
}

/// A local value mapped to a node
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub value: T,
    node: Option<NodeId>,
    relationships: BTreeMap<String, Vec<Outgoing>>,
}

impl<T> Mapped<T> {
    /// Wrap a value that has not been saved yet
    pub fn new(value: T) -> Self {
        Self {
            value,
            node: None,
            relationships: BTreeMap::new(),
        }
    }

    /// The node this value is mapped to, `None` until saved
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_saved(&self) -> bool {
        self.node.is_some()
    }

    /// Outgoing relationships of one type, in the order they were added
    pub fn related(&self, rel_type: &str) -> &[Outgoing] {
        self.relationships
            .get(rel_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All outgoing relationships, keyed by type
    pub fn relationships(&self) -> &BTreeMap<String, Vec<Outgoing>> {
        &self.relationships
    }

    /// Add a `rel_type` relationship to `end`, locally
    pub fn relate(&mut self, rel_type: impl Into<String>, end: NodeId, properties: Properties) {
        self.relationships
            .entry(rel_type.into())
            .or_default()
            .push(Outgoing { properties, end });
    }

    /// Remove `rel_type` relationships locally
    ///
    /// With `end` set only relationships to that node are removed, otherwise
    /// every relationship of the type goes.
    pub fn separate(&mut self, rel_type: &str, end: Option<NodeId>) {
        match end {
            None => {
                self.relationships.remove(rel_type);
            }
            Some(end) => {
                if let Some(rels) = self.relationships.get_mut(rel_type) {
                    rels.retain(|rel| rel.end != end);
                }
            }
        }
    }
}

/// Convert a value into node properties
///
/// The value must serialize to a map of scalars.
pub fn to_properties<T: Serialize>(value: &T) -> Result<Properties> {
    let json = serde_json::to_value(value)
        .map_err(|e| ReconcileError::Mapping(format!("Failed to serialize value: {e}")))?;
    let Value::Object(map) = json else {
        return Err(ReconcileError::Mapping(
            "value must serialize to a map".to_string(),
        ));
    };

    let mut properties = Properties::new();
    for (key, value) in map {
        if key.starts_with('_') {
            continue;
        }
        let value = PropertyValue::from_json(&value).ok_or_else(|| {
            ReconcileError::Mapping(format!("property `{key}` is not a scalar"))
        })?;
        properties.insert(key, value);
    }
    Ok(properties)
}

/// Build a value from node properties
pub fn from_properties<T: DeserializeOwned>(properties: &Properties) -> Result<T> {
    let map: Map<String, Value> = properties
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| (key.clone(), serde_json::json!(value)))
        .collect();
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ReconcileError::Mapping(format!("Failed to deserialize node: {e}")))
}

/// Loads and saves [`Mapped`] values through a [`Graph`]
#[derive(Clone)]
pub struct ObjectStore {
    graph: Graph,
}

impl ObjectStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Load a node and its outgoing relationships, `None` if the node does not exist
    pub async fn load<T: DeserializeOwned>(&self, node: NodeId) -> Result<Option<Mapped<T>>> {
        let Some(stored) = self.graph.node(node).await? else {
            return Ok(None);
        };

        let mut mapped = Mapped::new(from_properties(&stored.properties)?);
        mapped.node = Some(node);
        for rel in self
            .graph
            .relationships(node, Direction::Outgoing, None)
            .await?
        {
            mapped.relate(rel.rel_type, rel.end, rel.properties);
        }
        Ok(Some(mapped))
    }

    /// Load the end node of every `rel_type` relationship held by `subject`
    pub async fn load_related<T, U>(
        &self,
        subject: &Mapped<T>,
        rel_type: &str,
    ) -> Result<Vec<Mapped<U>>>
    where
        U: DeserializeOwned,
    {
        let mut related = Vec::new();
        for rel in subject.related(rel_type) {
            let mapped = self.load(rel.end).await?.ok_or_else(|| {
                ReconcileError::Mapping(format!("related node {} no longer exists", rel.end))
            })?;
            related.push(mapped);
        }
        Ok(related)
    }

    /// Write `object` to its node, creating the node on first save
    ///
    /// The node's properties and outgoing relationships are replaced by the
    /// local ones in a single batch.
    pub async fn save<T: Serialize>(&self, object: &mut Mapped<T>) -> Result<NodeId> {
        let properties = to_properties(&object.value)?;
        let node = match object.node {
            Some(node) => node,
            None => self
                .graph
                .create_nodes(std::slice::from_ref(&properties))
                .await?
                .into_iter()
                .next()
                .map(|node| node.id)
                .ok_or_else(|| ReconcileError::Mapping("store created no node".to_string()))?,
        };

        let mut operations = vec![
            BatchOperation::set_node_properties(node, properties),
            BatchOperation::delete_outgoing_relationships(node),
        ];
        for (rel_type, rels) in &object.relationships {
            for rel in rels {
                operations.push(BatchOperation::create_relationship(
                    node,
                    rel_type.as_str(),
                    rel.end,
                    rel.properties.clone(),
                ));
            }
        }

        debug!(%node, operations = operations.len(), "Saving mapped object");
        self.graph.store().execute_batch(&operations).await?;
        object.node = Some(node);
        Ok(node)
    }
}
