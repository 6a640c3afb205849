//! Cypher statement builders
//!
//! Relationship types are the only identifiers interpolated into statement
//! text, and always through [`cypher_escape`]. Every value travels as a
//! parameter.

use graphlink_core::cypher::cypher_escape;
use graphlink_core::{
    Endpoint, NodeId, Properties, RelationshipId, RelationshipPattern, RelationshipSpec,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::batch::BatchOperation;
use crate::error::{Result, StorageError};

/// Node property written and removed again to take a node's write lock
const LOCK_PROPERTY: &str = "_graphlink_lock";

const RETURN_NODE: &str = "RETURN id(n) AS id, properties(n) AS properties";

const RETURN_RELATIONSHIP: &str = "RETURN id(r) AS id, id(startNode(r)) AS start, \
     type(r) AS type, id(endNode(r)) AS end, properties(r) AS properties";

/// One statement of a transactional request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Statement {
    pub statement: String,
    pub parameters: Map<String, Value>,
    #[serde(rename = "resultDataContents")]
    pub result_data_contents: [&'static str; 1],
}

impl Statement {
    fn new(statement: String) -> Self {
        Self {
            statement,
            parameters: Map::new(),
            result_data_contents: ["row"],
        }
    }

    fn param(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }
}

/// Properties as a parameter map
///
/// The store cannot hold null properties, so null-valued keys are dropped
/// both when writing and when comparing.
pub(crate) fn stored_properties(properties: &Properties) -> Value {
    Value::Object(
        properties
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), json!(value)))
            .collect(),
    )
}

fn escaped_type(rel_type: &str, index: usize) -> Result<String> {
    cypher_escape(rel_type).map_err(|e| StorageError::InvalidOperation {
        index,
        reason: e.to_string(),
    })
}

pub(crate) fn node_by_id(id: NodeId) -> Statement {
    Statement::new(format!("MATCH (n) WHERE id(n) = $id {RETURN_NODE}"))
        .param("id", json!(id.0))
}

pub(crate) fn relationship_by_id(id: RelationshipId) -> Statement {
    Statement::new(format!(
        "MATCH ()-[r]->() WHERE id(r) = $id {RETURN_RELATIONSHIP}"
    ))
    .param("id", json!(id.0))
}

pub(crate) fn find_relationships(pattern: &RelationshipPattern) -> Result<Statement> {
    let rel = match &pattern.rel_type {
        Some(rel_type) => format!("[r:{}]", escaped_type(rel_type, 0)?),
        None => "[r]".to_string(),
    };

    let mut conditions = Vec::new();
    let mut parameters = Map::new();
    if let Some(start) = pattern.start {
        conditions.push("id(a) = $start");
        parameters.insert("start".to_string(), json!(start.0));
    }
    if let Some(end) = pattern.end {
        conditions.push("id(b) = $end");
        parameters.insert("end".to_string(), json!(end.0));
    }
    if let Some(properties) = &pattern.properties {
        conditions.push("properties(r) = $match");
        parameters.insert("match".to_string(), stored_properties(properties));
    }
    let filter = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let mut statement = Statement::new(format!(
        "MATCH (a)-{rel}->(b){filter} {RETURN_RELATIONSHIP} ORDER BY id"
    ));
    statement.parameters = parameters;
    Ok(statement)
}

fn create_node(properties: &Properties) -> Statement {
    Statement::new(format!("CREATE (n) SET n = $props {RETURN_NODE}"))
        .param("props", stored_properties(properties))
}

fn create_relationship(
    start: NodeId,
    rel_type: &str,
    end: NodeId,
    properties: &Properties,
    index: usize,
) -> Result<Statement> {
    let rel_type = escaped_type(rel_type, index)?;
    Ok(Statement::new(format!(
        "MATCH (a) WHERE id(a) = $start MATCH (b) WHERE id(b) = $end \
         CREATE (a)-[r:{rel_type}]->(b) SET r = $props {RETURN_RELATIONSHIP}"
    ))
    .param("start", json!(start.0))
    .param("end", json!(end.0))
    .param("props", stored_properties(properties)))
}

/// Single statement that returns the matching relationships, or creates one
///
/// Yields no rows when a concrete endpoint does not exist and more than one
/// row when the match is ambiguous. A wildcard endpoint is left unbound so
/// `CREATE` makes a fresh node for it.
///
/// Every concrete endpoint is write-locked, in ascending id order, before the
/// existing relationships are read. The locks are held until the transaction
/// ends, so two transactions reconciling the same edge run one after the
/// other and the second one sees the edge the first one created.
fn get_or_create_relationship(spec: &RelationshipSpec, index: usize) -> Result<Statement> {
    let rel_type = escaped_type(&spec.rel_type, index)?;

    let mut clauses = Vec::new();
    let mut bound = Vec::new();
    let mut parameters = Map::new();
    for (var, name, endpoint) in [("a", "start", spec.start), ("b", "end", spec.end)] {
        if let Endpoint::Node(id) = endpoint {
            clauses.push(format!("MATCH ({var}) WHERE id({var}) = ${name}"));
            bound.push((var, id));
            parameters.insert(name.to_string(), json!(id.0));
        }
    }
    bound.sort_by_key(|(_, id)| *id);
    let locks: Vec<String> = bound
        .iter()
        .map(|(var, _)| format!("{var}.{LOCK_PROPERTY}"))
        .collect();
    let bound = bound
        .iter()
        .map(|(var, _)| *var)
        .collect::<Vec<_>>()
        .join(", ");
    let set_locks = locks
        .iter()
        .map(|lock| format!("{lock} = true"))
        .collect::<Vec<_>>()
        .join(", ");
    if !locks.is_empty() {
        clauses.push(format!(
            "SET {set_locks} REMOVE {} WITH {bound}",
            locks.join(", ")
        ));
    }

    let filter = match &spec.properties {
        Some(properties) => {
            parameters.insert("match".to_string(), stored_properties(properties));
            " WHERE properties(r) = $match"
        }
        None => "",
    };
    parameters.insert(
        "props".to_string(),
        stored_properties(&spec.creation_properties()),
    );

    clauses.push(format!("OPTIONAL MATCH (a)-[r:{rel_type}]->(b){filter}"));
    clauses.push(format!("WITH {bound}, collect(r) AS found"));
    clauses.push(format!(
        "CALL {{ WITH {bound}, found WITH {bound}, found WHERE size(found) = 0 \
         CREATE (a)-[r:{rel_type}]->(b) SET r = $props RETURN collect(r) AS created }}"
    ));
    clauses.push("UNWIND found + created AS r".to_string());
    clauses.push(RETURN_RELATIONSHIP.to_string());

    let mut statement = Statement::new(clauses.join(" "));
    statement.parameters = parameters;
    Ok(statement)
}

fn set_node_properties(node: NodeId, properties: &Properties) -> Statement {
    Statement::new(format!(
        "MATCH (n) WHERE id(n) = $id SET n = $props {RETURN_NODE}"
    ))
    .param("id", json!(node.0))
    .param("props", stored_properties(properties))
}

/// Yields no rows when the node does not exist
fn delete_outgoing_relationships(node: NodeId) -> Statement {
    Statement::new(
        "MATCH (n) WHERE id(n) = $id OPTIONAL MATCH (n)-[r]->() \
         WITH n, collect(r) AS rels FOREACH (r IN rels | DELETE r) \
         RETURN size(rels) AS deleted"
            .to_string(),
    )
    .param("id", json!(node.0))
}

/// Statement executing one batch operation
pub(crate) fn for_operation(operation: &BatchOperation, index: usize) -> Result<Statement> {
    match operation {
        BatchOperation::CreateNode { properties } => Ok(create_node(properties)),
        BatchOperation::CreateRelationship {
            start,
            rel_type,
            end,
            properties,
        } => create_relationship(*start, rel_type, *end, properties, index),
        BatchOperation::GetOrCreateRelationship(spec) => get_or_create_relationship(spec, index),
        BatchOperation::SetNodeProperties { node, properties } => {
            Ok(set_node_properties(*node, properties))
        }
        BatchOperation::DeleteOutgoingRelationships { node } => {
            Ok(delete_outgoing_relationships(*node))
        }
    }
}
