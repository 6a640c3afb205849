//! Wire types of the transactional HTTP endpoint and row decoding

use graphlink_core::{Node, NodeId, Properties, PropertyValue, Relationship, RelationshipId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::statements::Statement;
use crate::error::{Result, StorageError};

/// Request body for opening, running in, or committing a transaction
#[derive(Debug, Serialize)]
pub(crate) struct TransactionRequest<'a> {
    pub statements: &'a [Statement],
}

/// Response body of every transactional call
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub errors: Vec<ServerError>,
    /// Commit URL, present while the transaction is open
    #[serde(default)]
    pub commit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatementResult {
    #[serde(default)]
    pub data: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultRow {
    pub row: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServerError {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Transient errors leave the database untouched and may succeed on retry
    pub fn into_storage_error(self) -> StorageError {
        if self.code.starts_with("Neo.TransientError") {
            StorageError::Unavailable(format!("{}: {}", self.code, self.message))
        } else {
            StorageError::Server {
                code: self.code,
                message: self.message,
            }
        }
    }
}

impl TransactionResponse {
    /// Fail with the first server error, if any
    pub fn check(self) -> Result<Self> {
        match self.errors.first() {
            Some(error) => Err(error.clone().into_storage_error()),
            None => Ok(self),
        }
    }
}

fn field<'a>(row: &'a [Value], index: usize, name: &str) -> Result<&'a Value> {
    row.get(index)
        .ok_or_else(|| StorageError::Protocol(format!("row is missing column `{name}`")))
}

fn integer(row: &[Value], index: usize, name: &str) -> Result<i64> {
    field(row, index, name)?
        .as_i64()
        .ok_or_else(|| StorageError::Protocol(format!("column `{name}` is not an integer")))
}

fn properties(row: &[Value], index: usize) -> Result<Properties> {
    let Value::Object(map) = field(row, index, "properties")? else {
        return Err(StorageError::Protocol(
            "column `properties` is not a map".to_string(),
        ));
    };
    map.iter()
        .map(|(key, value)| {
            PropertyValue::from_json(value)
                .map(|value| (key.clone(), value))
                .ok_or_else(|| {
                    StorageError::Protocol(format!("property `{key}` is not a scalar value"))
                })
        })
        .collect()
}

/// Decode a `[id, properties]` row
pub(crate) fn parse_node(row: &[Value]) -> Result<Node> {
    Ok(Node {
        id: NodeId(integer(row, 0, "id")?),
        properties: properties(row, 1)?,
    })
}

/// Decode an `[id, start, type, end, properties]` row
pub(crate) fn parse_relationship(row: &[Value]) -> Result<Relationship> {
    let rel_type = field(row, 2, "type")?
        .as_str()
        .ok_or_else(|| StorageError::Protocol("column `type` is not a string".to_string()))?;
    Ok(Relationship {
        id: RelationshipId(integer(row, 0, "id")?),
        start: NodeId(integer(row, 1, "start")?),
        rel_type: rel_type.to_string(),
        end: NodeId(integer(row, 3, "end")?),
        properties: properties(row, 4)?,
    })
}

/// Put back the null-valued keys the store dropped on write
/// Decode a single-column count row
pub(crate) fn parse_count(row: &[Value]) -> Result<usize> {
    let count = integer(row, 0, "count")?;
    usize::try_from(count)
        .map_err(|_| StorageError::Protocol(format!("column `count` is negative: {count}")))
}

pub(crate) fn restore_nulls(stored: &mut Properties, requested: &Properties) {
    for (key, value) in requested {
        if value.is_null() {
            stored.entry(key.clone()).or_insert(PropertyValue::Null);
        }
    }
}
